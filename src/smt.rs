// SPDX-License-Identifier: Apache-2.0

//! Data contracts for SMT-based satisfiability checks.
//!
//! This module renders constraint sets as SMT-LIB2 text and parses the model
//! output that solvers print back; it never spawns or links a solver. The
//! driving component owns the process/FFI plumbing and exchanges
//! [`QueryConfig`], [`Constraint`], [`Model`] and [`SolverResult`] values
//! with it.
//!
//! Everything here speaks `QF_BV`: each variable becomes a
//! `(declare-const name (_ BitVec N))` and each operator maps onto its
//! bit-vector counterpart, with comparisons wrapped back into one-bit
//! vectors so the rendered terms keep the same widths as the functions they
//! came from.

use std::collections::{BTreeMap, HashMap};

use crate::bf::{BooleanFunction, Node, NodePayload, Op};
use crate::bf_simplify;
use crate::bf_substitute;
use crate::value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverType {
    Z3,
    Boolector,
    Bitwuzla,
}

impl std::fmt::Display for SolverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverType::Z3 => write!(f, "z3"),
            SolverType::Boolector => write!(f, "boolector"),
            SolverType::Bitwuzla => write!(f, "bitwuzla"),
        }
    }
}

/// How the external driver reaches the solver: spawning its binary or
/// calling into a linked library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverCall {
    Binary,
    Library,
}

/// Fluent configuration for one solver query. The engine only consumes
/// `generate_model` (it decides whether the rendered script requests a
/// model); the remaining fields parameterize the external driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub solver: SolverType,
    pub call: SolverCall,
    pub local: bool,
    pub generate_model: bool,
    pub timeout_in_seconds: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            solver: SolverType::Z3,
            call: SolverCall::Binary,
            local: true,
            generate_model: true,
            timeout_in_seconds: 10,
        }
    }
}

impl QueryConfig {
    pub fn with_solver(mut self, solver: SolverType) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_call(mut self, call: SolverCall) -> Self {
        self.call = call;
        self
    }

    pub fn with_local_solver(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn with_remote_solver(mut self) -> Self {
        self.local = false;
        self
    }

    pub fn with_model_generation(mut self) -> Self {
        self.generate_model = true;
        self
    }

    pub fn without_model_generation(mut self) -> Self {
        self.generate_model = false;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout_in_seconds = seconds;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The expression must evaluate to the single-bit 1.
    Expression(BooleanFunction),
    /// The two sides must be equal.
    Equality(BooleanFunction, BooleanFunction),
}

impl Constraint {
    pub fn get_expression(&self) -> Result<&BooleanFunction, String> {
        match self {
            Constraint::Expression(f) => Ok(f),
            Constraint::Equality(..) => Err("constraint is an equality".to_string()),
        }
    }

    pub fn get_equality(&self) -> Result<(&BooleanFunction, &BooleanFunction), String> {
        match self {
            Constraint::Equality(lhs, rhs) => Ok((lhs, rhs)),
            Constraint::Expression(_) => Err("constraint is a bare expression".to_string()),
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Expression(e) => write!(f, "{}", e),
            Constraint::Equality(lhs, rhs) => write!(f, "{} == {}", lhs, rhs),
        }
    }
}

/// Renders `constraints` as a complete SMT-LIB2 script: option/logic
/// preamble, one `declare-const` per free variable, one `assert` per
/// constraint, then `check-sat` and (with model generation on)
/// `get-model`.
pub fn constraints_to_smt2(
    constraints: &[Constraint],
    config: &QueryConfig,
) -> Result<String, String> {
    let variables = collect_variables(constraints)?;

    let mut script = String::new();
    if config.generate_model {
        script.push_str("(set-option :produce-models true)\n");
    }
    script.push_str("(set-logic QF_BV)\n");
    for (name, width) in &variables {
        script.push_str(&format!("(declare-const {} (_ BitVec {}))\n", name, width));
    }
    for constraint in constraints {
        script.push_str(&format!("(assert {})\n", constraint_to_term(constraint)?));
    }
    script.push_str("(check-sat)\n");
    if config.generate_model {
        script.push_str("(get-model)\n");
    }
    log::debug!(
        "rendered SMT query: {} constraint(s), {} variable(s)",
        constraints.len(),
        variables.len()
    );
    Ok(script)
}

/// Union of the free variables of all constrained functions, with widths
/// checked for consistency across constraints.
fn collect_variables(constraints: &[Constraint]) -> Result<BTreeMap<String, usize>, String> {
    let mut variables: BTreeMap<String, usize> = BTreeMap::new();
    let mut add = |f: &BooleanFunction| -> Result<(), String> {
        for (name, width) in f.get_variables() {
            match variables.get(&name) {
                Some(previous) if *previous != width => {
                    return Err(format!(
                        "variable '{}' is used with widths {} and {} across constraints",
                        name, previous, width
                    ));
                }
                _ => {
                    variables.insert(name, width);
                }
            }
        }
        Ok(())
    };
    for constraint in constraints {
        match constraint {
            Constraint::Expression(f) => add(f)?,
            Constraint::Equality(lhs, rhs) => {
                add(lhs)?;
                add(rhs)?;
            }
        }
    }
    Ok(variables)
}

fn constraint_to_term(constraint: &Constraint) -> Result<String, String> {
    match constraint {
        Constraint::Expression(f) => {
            if f.is_empty() {
                return Err("cannot constrain the empty function".to_string());
            }
            if f.size() != 1 {
                return Err(format!(
                    "expression constraints must be single-bit; got width {}",
                    f.size()
                ));
            }
            Ok(format!("(= {} #b1)", f.to_string_with(smt_node_printer)?))
        }
        Constraint::Equality(lhs, rhs) => {
            if lhs.is_empty() || rhs.is_empty() {
                return Err("cannot constrain the empty function".to_string());
            }
            if lhs.size() != rhs.size() {
                return Err(format!(
                    "equality constraint sides have widths {} and {}",
                    lhs.size(),
                    rhs.size()
                ));
            }
            Ok(format!(
                "(= {} {})",
                lhs.to_string_with(smt_node_printer)?,
                rhs.to_string_with(smt_node_printer)?
            ))
        }
    }
}

/// Per-node callback that renders QF_BV terms through
/// [`BooleanFunction::to_string_with`]. Comparisons and `ite` conditions
/// are bridged between Bool and `(_ BitVec 1)` with `ite`/`= #b1`.
fn smt_node_printer(node: &Node, operands: &[String], tops: &[&Node]) -> Result<String, String> {
    match &node.payload {
        NodePayload::Constant(values) => {
            if !value::all_known(values) {
                return Err(format!(
                    "constant bits[{}]:0b{} has unknown digits; cannot render for SMT",
                    values.len(),
                    value::values_to_bin_string(values)
                ));
            }
            Ok(format!("#b{}", value::values_to_bin_string(values)))
        }
        // Structural parameter; the consuming operator reads it from the
        // operand node directly.
        NodePayload::Index(value) => Ok(value.to_string()),
        NodePayload::Variable(name) => Ok(name.clone()),
        NodePayload::Op(op) => match op {
            Op::And => Ok(format!("(bvand {} {})", operands[0], operands[1])),
            Op::Or => Ok(format!("(bvor {} {})", operands[0], operands[1])),
            Op::Xor => Ok(format!("(bvxor {} {})", operands[0], operands[1])),
            Op::Not => Ok(format!("(bvnot {})", operands[0])),
            Op::Add => Ok(format!("(bvadd {} {})", operands[0], operands[1])),
            Op::Sub => Ok(format!("(bvsub {} {})", operands[0], operands[1])),
            Op::Mul => Ok(format!("(bvmul {} {})", operands[0], operands[1])),
            Op::Sdiv => Ok(format!("(bvsdiv {} {})", operands[0], operands[1])),
            Op::Udiv => Ok(format!("(bvudiv {} {})", operands[0], operands[1])),
            Op::Srem => Ok(format!("(bvsrem {} {})", operands[0], operands[1])),
            Op::Urem => Ok(format!("(bvurem {} {})", operands[0], operands[1])),
            // SMT concat also takes the most significant operand first.
            Op::Concat => Ok(format!("(concat {} {})", operands[0], operands[1])),
            Op::Slice => {
                let start = tops[1].get_index_value()?;
                let end = tops[2].get_index_value()?;
                Ok(format!("((_ extract {} {}) {})", end, start, operands[0]))
            }
            Op::Zext => {
                let padding = node.size - tops[0].size;
                if padding == 0 {
                    Ok(operands[0].clone())
                } else {
                    Ok(format!("((_ zero_extend {}) {})", padding, operands[0]))
                }
            }
            Op::Sext => {
                let padding = node.size - tops[0].size;
                if padding == 0 {
                    Ok(operands[0].clone())
                } else {
                    Ok(format!("((_ sign_extend {}) {})", padding, operands[0]))
                }
            }
            Op::Eq => Ok(format!(
                "(ite (= {} {}) #b1 #b0)",
                operands[0], operands[1]
            )),
            Op::Sle => Ok(format!(
                "(ite (bvsle {} {}) #b1 #b0)",
                operands[0], operands[1]
            )),
            Op::Slt => Ok(format!(
                "(ite (bvslt {} {}) #b1 #b0)",
                operands[0], operands[1]
            )),
            Op::Ule => Ok(format!(
                "(ite (bvule {} {}) #b1 #b0)",
                operands[0], operands[1]
            )),
            Op::Ult => Ok(format!(
                "(ite (bvult {} {}) #b1 #b0)",
                operands[0], operands[1]
            )),
            Op::Ite => Ok(format!(
                "(ite (= {} #b1) {} {})",
                operands[0], operands[1], operands[2]
            )),
        },
    }
}

/// A satisfying assignment parsed from solver output: variable name to
/// (value, width).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model {
    entries: BTreeMap<String, (u64, usize)>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, (u64, usize)> {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<(u64, usize)> {
        self.entries.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, value: u64, width: usize) {
        self.entries.insert(name.to_string(), (value, width));
    }

    /// Parses solver model output in the given solver's dialect.
    ///
    /// Z3 and Bitwuzla print `(define-fun name () (_ BitVec N) value)`
    /// entries with `#b`/`#x`/`(_ bvD N)` values (plus `Bool` with
    /// `true`/`false`); Boolector prints `((name #b...))` assignment pairs.
    /// Output without any assignment, e.g. a bare `sat` for a
    /// variable-free query, parses as the empty model.
    pub fn parse(text: &str, solver: SolverType) -> Result<Model, String> {
        let tokens: Vec<String> = text
            .replace('(', " ")
            .replace(')', " ")
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        let mut model = Model::new();
        match solver {
            SolverType::Z3 | SolverType::Bitwuzla => {
                let mut i = 0;
                while i < tokens.len() {
                    if tokens[i] != "define-fun" {
                        i += 1;
                        continue;
                    }
                    i = parse_define_fun(&tokens, i + 1, &mut model)?;
                }
            }
            SolverType::Boolector => {
                let mut i = 0;
                while i < tokens.len() {
                    let token = &tokens[i];
                    if matches!(token.as_str(), "sat" | "unsat" | "unknown" | "model") {
                        i += 1;
                        continue;
                    }
                    let value = tokens.get(i + 1).ok_or_else(|| {
                        format!("assignment for '{}' is missing its value", token)
                    })?;
                    let (value, width) = parse_literal_value(value)?;
                    model.entries.insert(token.clone(), (value, width));
                    i += 2;
                }
            }
        }
        Ok(model)
    }

    /// Substitutes every binding as a constant and simplifies, returning
    /// the residual function. With a complete model the residual is a
    /// constant; with a partial one the unbound variables survive.
    pub fn evaluate(&self, f: &BooleanFunction) -> Result<BooleanFunction, String> {
        let mut replacements = HashMap::new();
        for (name, (value, width)) in &self.entries {
            let constant = BooleanFunction::constant_u64(*value, *width)
                .map_err(|e| format!("model binding for '{}': {}", name, e))?;
            replacements.insert(name.clone(), constant);
        }
        let substituted =
            bf_substitute::substitute_map(f, &replacements).map_err(|e| e.to_string())?;
        Ok(bf_simplify::simplify(&substituted))
    }
}

/// Parses one `define-fun` body starting at the name token; returns the
/// index of the first token after the entry.
fn parse_define_fun(
    tokens: &[String],
    at: usize,
    model: &mut Model,
) -> Result<usize, String> {
    let name = tokens
        .get(at)
        .ok_or_else(|| "define-fun is missing its name".to_string())?;
    let sort = tokens
        .get(at + 1)
        .ok_or_else(|| format!("define-fun for '{}' is missing its sort", name))?;
    match sort.as_str() {
        "Bool" => {
            let value = tokens
                .get(at + 2)
                .ok_or_else(|| format!("define-fun for '{}' is missing its value", name))?;
            let value = match value.as_str() {
                "true" => 1,
                "false" => 0,
                other => return Err(format!("bad Bool value {:?} for '{}'", other, name)),
            };
            model.entries.insert(name.clone(), (value, 1));
            Ok(at + 3)
        }
        "_" => {
            let kind = tokens
                .get(at + 2)
                .ok_or_else(|| format!("define-fun for '{}' has a truncated sort", name))?;
            if kind != "BitVec" {
                return Err(format!("unsupported sort '{}' for '{}'", kind, name));
            }
            let width: usize = tokens
                .get(at + 3)
                .ok_or_else(|| format!("define-fun for '{}' is missing its width", name))?
                .parse()
                .map_err(|e| format!("bad width for '{}': {}", name, e))?;
            if width > 64 {
                return Err(format!(
                    "model value for '{}' is {} bits wide; max is 64",
                    name, width
                ));
            }
            let (value, next) = parse_bitvec_value(tokens, at + 4, name)?;
            if width < 64 && (value >> width) != 0 {
                return Err(format!(
                    "model value {} for '{}' does not fit in {} bit(s)",
                    value, name, width
                ));
            }
            model.entries.insert(name.clone(), (value, width));
            Ok(next)
        }
        other => Err(format!("unsupported sort '{}' for '{}'", other, name)),
    }
}

/// Parses a bit-vector value at `at`: `#b...`, `#x...` or `_ bvD N`.
/// Returns the value and the index after the consumed tokens.
fn parse_bitvec_value(
    tokens: &[String],
    at: usize,
    name: &str,
) -> Result<(u64, usize), String> {
    let token = tokens
        .get(at)
        .ok_or_else(|| format!("define-fun for '{}' is missing its value", name))?;
    if token == "_" {
        let literal = tokens
            .get(at + 1)
            .ok_or_else(|| format!("truncated bv literal for '{}'", name))?;
        let digits = literal
            .strip_prefix("bv")
            .ok_or_else(|| format!("bad bv literal {:?} for '{}'", literal, name))?;
        let value: u64 = digits
            .parse()
            .map_err(|e| format!("bad bv literal {:?} for '{}': {}", literal, name, e))?;
        // The trailing width token duplicates the declared sort.
        Ok((value, at + 3))
    } else {
        let (value, _width) = parse_literal_value(token)?;
        Ok((value, at + 1))
    }
}

/// Parses a `#b`/`#x` literal into (value, width). Don't-care `x` digits
/// that some solvers leave in assignments count as zero.
fn parse_literal_value(token: &str) -> Result<(u64, usize), String> {
    if let Some(digits) = token.strip_prefix("#b") {
        if digits.is_empty() || digits.len() > 64 {
            return Err(format!("bad binary literal {:?}", token));
        }
        let concrete: String = digits
            .chars()
            .map(|c| if c == 'x' || c == 'X' { '0' } else { c })
            .collect();
        let value = u64::from_str_radix(&concrete, 2)
            .map_err(|e| format!("bad binary literal {:?}: {}", token, e))?;
        Ok((value, digits.len()))
    } else if let Some(digits) = token.strip_prefix("#x") {
        if digits.is_empty() || digits.len() > 16 {
            return Err(format!("bad hex literal {:?}", token));
        }
        let value = u64::from_str_radix(digits, 16)
            .map_err(|e| format!("bad hex literal {:?}: {}", token, e))?;
        Ok((value, 4 * digits.len()))
    } else {
        Err(format!("expected #b or #x literal, got {:?}", token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    Sat(Option<Model>),
    Unsat,
    Unknown,
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverResult::Unknown)
    }

    pub fn get_model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(model) => model.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Sat(_) => write!(f, "sat"),
            SolverResult::Unsat => write!(f, "unsat"),
            SolverResult::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn var(name: &str, size: usize) -> BooleanFunction {
        BooleanFunction::var(name, size).unwrap()
    }

    #[test]
    fn test_query_config_defaults_and_fluency() {
        let config = QueryConfig::default();
        assert_eq!(config.solver, SolverType::Z3);
        assert_eq!(config.call, SolverCall::Binary);
        assert!(config.local);
        assert!(config.generate_model);
        assert_eq!(config.timeout_in_seconds, 10);

        let config = QueryConfig::default()
            .with_solver(SolverType::Bitwuzla)
            .with_call(SolverCall::Library)
            .with_remote_solver()
            .without_model_generation()
            .with_timeout(60);
        assert_eq!(config.solver, SolverType::Bitwuzla);
        assert_eq!(config.call, SolverCall::Library);
        assert!(!config.local);
        assert!(!config.generate_model);
        assert_eq!(config.timeout_in_seconds, 60);

        // The positive forms undo the negative ones.
        let config = config.with_local_solver().with_model_generation();
        assert!(config.local);
        assert!(config.generate_model);
    }

    #[test]
    fn test_constraint_accessors() {
        let e = Constraint::Expression(var("a", 1));
        assert!(e.get_expression().is_ok());
        assert!(e.get_equality().is_err());
        assert_eq!(e.to_string(), "a");

        let q = Constraint::Equality(var("a", 4), var("b", 4));
        assert!(q.get_equality().is_ok());
        assert!(q.get_expression().is_err());
        assert_eq!(q.to_string(), "a: bits[4] == b: bits[4]");
    }

    #[test]
    fn test_render_expression_constraint() {
        let a = var("a", 4);
        let b = var("b", 4);
        let f = BooleanFunction::ult(&a, &b, 1).unwrap();
        let script =
            constraints_to_smt2(&[Constraint::Expression(f)], &QueryConfig::default()).unwrap();
        assert!(script.contains("(set-option :produce-models true)"), "{}", script);
        assert!(script.contains("(set-logic QF_BV)"), "{}", script);
        assert!(script.contains("(declare-const a (_ BitVec 4))"), "{}", script);
        assert!(script.contains("(declare-const b (_ BitVec 4))"), "{}", script);
        assert!(
            script.contains("(assert (= (ite (bvult a b) #b1 #b0) #b1))"),
            "{}",
            script
        );
        assert!(script.contains("(check-sat)"), "{}", script);
        assert!(script.contains("(get-model)"), "{}", script);
    }

    #[test]
    fn test_render_without_model_generation() {
        let f = var("a", 1);
        let script = constraints_to_smt2(
            &[Constraint::Expression(f)],
            &QueryConfig::default().without_model_generation(),
        )
        .unwrap();
        assert!(!script.contains("produce-models"), "{}", script);
        assert!(!script.contains("get-model"), "{}", script);
    }

    #[test]
    fn test_render_equality_constraint() {
        let a = var("a", 4);
        let b = var("b", 4);
        let sum = BooleanFunction::add(&a, &b, 4).unwrap();
        let ten = BooleanFunction::constant_u64(10, 4).unwrap();
        let script = constraints_to_smt2(
            &[Constraint::Equality(sum, ten)],
            &QueryConfig::default(),
        )
        .unwrap();
        assert!(script.contains("(assert (= (bvadd a b) #b1010))"), "{}", script);
    }

    #[test]
    fn test_render_structural_operators() {
        let a = var("a", 4);
        let sliced = BooleanFunction::slice(&a, 1, 2, 2).unwrap();
        let widened = BooleanFunction::zext(&sliced, 4).unwrap();
        let three = BooleanFunction::constant_u64(3, 4).unwrap();
        let script = constraints_to_smt2(
            &[Constraint::Equality(widened, three)],
            &QueryConfig::default(),
        )
        .unwrap();
        assert!(
            script.contains("(assert (= ((_ zero_extend 2) ((_ extract 2 1) a)) #b0011))"),
            "{}",
            script
        );
    }

    #[test]
    fn test_render_ite() {
        let c = var("c", 1);
        let t = var("t", 1);
        let e = var("e", 1);
        let f = BooleanFunction::ite(&c, &t, &e, 1).unwrap();
        let script =
            constraints_to_smt2(&[Constraint::Expression(f)], &QueryConfig::default()).unwrap();
        assert!(
            script.contains("(assert (= (ite (= c #b1) t e) #b1))"),
            "{}",
            script
        );
    }

    #[test]
    fn test_render_rejects_wide_expression() {
        let f = var("a", 4);
        let err = constraints_to_smt2(&[Constraint::Expression(f)], &QueryConfig::default())
            .unwrap_err();
        assert!(err.contains("single-bit"), "got: {}", err);
    }

    #[test]
    fn test_render_rejects_unknown_constant() {
        let c = BooleanFunction::constant(vec![Value::X]).unwrap();
        let f = BooleanFunction::and(&var("a", 1), &c, 1).unwrap();
        let err = constraints_to_smt2(&[Constraint::Expression(f)], &QueryConfig::default())
            .unwrap_err();
        assert!(err.contains("unknown digits"), "got: {}", err);
    }

    #[test]
    fn test_render_rejects_width_conflicts() {
        let narrow = Constraint::Expression(var("a", 1));
        let wide = Constraint::Equality(var("a", 4), var("b", 4));
        let err =
            constraints_to_smt2(&[narrow, wide], &QueryConfig::default()).unwrap_err();
        assert!(err.contains("widths 1 and 4"), "got: {}", err);

        let empty = Constraint::Expression(BooleanFunction::default());
        let err = constraints_to_smt2(&[empty], &QueryConfig::default()).unwrap_err();
        assert!(err.contains("empty function"), "got: {}", err);
    }

    #[test]
    fn test_parse_z3_model() {
        let text = r#"
sat
(model
  (define-fun a () (_ BitVec 4) #xa)
  (define-fun b () (_ BitVec 1) #b1)
  (define-fun c () (_ BitVec 8) (_ bv77 8))
  (define-fun p () Bool true)
)
"#;
        let model = Model::parse(text, SolverType::Z3).unwrap();
        assert_eq!(model.get("a"), Some((10, 4)));
        assert_eq!(model.get("b"), Some((1, 1)));
        assert_eq!(model.get("c"), Some((77, 8)));
        assert_eq!(model.get("p"), Some((1, 1)));
        assert_eq!(model.entries().len(), 4);
    }

    #[test]
    fn test_parse_bitwuzla_model() {
        let text = "sat\n((define-fun x () (_ BitVec 4) #b0110))";
        let model = Model::parse(text, SolverType::Bitwuzla).unwrap();
        assert_eq!(model.get("x"), Some((6, 4)));
    }

    #[test]
    fn test_parse_boolector_model() {
        let text = "sat\n((a #b0101))\n((b #b1))";
        let model = Model::parse(text, SolverType::Boolector).unwrap();
        assert_eq!(model.get("a"), Some((5, 4)));
        assert_eq!(model.get("b"), Some((1, 1)));
    }

    #[test]
    fn test_parse_boolector_dont_care_digits() {
        let model = Model::parse("((a #b0x1))", SolverType::Boolector).unwrap();
        assert_eq!(model.get("a"), Some((1, 3)));
    }

    #[test]
    fn test_parse_model_without_assignments() {
        let model = Model::parse("sat\n", SolverType::Z3).unwrap();
        assert!(model.entries().is_empty());
    }

    #[test]
    fn test_parse_model_errors() {
        let err = Model::parse(
            "(define-fun a () (_ BitVec 2) #b111)",
            SolverType::Z3,
        )
        .unwrap_err();
        assert!(err.contains("does not fit"), "got: {}", err);

        let err = Model::parse("((a zzz))", SolverType::Boolector).unwrap_err();
        assert!(err.contains("expected #b or #x"), "got: {}", err);
    }

    #[test]
    fn test_model_evaluate_to_constant() {
        let a = var("a", 4);
        let b = var("b", 4);
        let f = BooleanFunction::ult(&a, &b, 1).unwrap();
        let mut model = Model::new();
        model.insert("a", 2, 4);
        model.insert("b", 3, 4);
        let residual = model.evaluate(&f).unwrap();
        assert_eq!(residual, BooleanFunction::constant_bit(Value::One));
    }

    #[test]
    fn test_model_evaluate_partial() {
        let f = BooleanFunction::and(&var("a", 1), &var("m", 1), 1).unwrap();
        let mut model = Model::new();
        model.insert("m", 1, 1);
        let residual = model.evaluate(&f).unwrap();
        assert_eq!(residual, var("a", 1));
    }

    #[test]
    fn test_solver_result() {
        let mut model = Model::new();
        model.insert("a", 1, 1);
        let sat = SolverResult::Sat(Some(model.clone()));
        assert!(sat.is_sat());
        assert!(!sat.is_unsat());
        assert_eq!(sat.get_model(), Some(&model));
        assert_eq!(sat.to_string(), "sat");

        assert!(SolverResult::Unsat.is_unsat());
        assert!(SolverResult::Unknown.is_unknown());
        assert_eq!(SolverResult::Sat(None).get_model(), None);
        assert_eq!(SolverResult::Unsat.get_model(), None);
    }
}
