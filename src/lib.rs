// SPDX-License-Identifier: Apache-2.0

//! Symbolic Boolean/bit-vector expressions: construction with validation,
//! rewriting-based simplification, substitution, four-state concrete
//! evaluation and truth tables, a round-trippable text format, and the
//! data contracts exchanged with an external SMT solver driver.

pub mod bf;
pub mod bf_eval;
pub mod bf_parser;
pub mod bf_simplify;
pub mod bf_substitute;
pub mod bf_validate;
pub mod fuzz_utils;
pub mod smt;
pub mod value;
