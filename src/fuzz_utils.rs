// SPDX-License-Identifier: Apache-2.0

//! Random expression generation for tests and benchmarks.

use crate::bf::BooleanFunction;
use crate::value::Value;

/// Generates an arbitrary digit vector of the given width using the
/// provided random number generator. With `allow_unknown` an eighth of the
/// digits, on average, come out as `X` or `Z`.
pub fn arbitrary_values<R: rand::Rng>(rng: &mut R, width: usize, allow_unknown: bool) -> Vec<Value> {
    (0..width)
        .map(|_| {
            if allow_unknown && rng.gen_ratio(1, 8) {
                if rng.gen_bool(0.5) { Value::X } else { Value::Z }
            } else {
                Value::from_bool(rng.gen_bool(0.5))
            }
        })
        .collect()
}

/// Generates an arbitrary expression of uniform `width` over the given
/// variable names, `depth` operator levels deep at most. Constants are
/// always fully known so that generated expressions behave identically
/// under evaluation and constant folding.
pub fn arbitrary_boolean_function<R: rand::Rng>(
    rng: &mut R,
    variables: &[&str],
    width: usize,
    depth: usize,
) -> BooleanFunction {
    assert!(width >= 1, "width must be non-zero");
    if depth == 0 || rng.gen_ratio(1, 4) {
        // Leaf: a variable when any are available, otherwise a constant.
        if !variables.is_empty() && rng.gen_bool(0.75) {
            let name = variables[rng.gen_range(0..variables.len())];
            // Unwrapping is safe since the width is non-zero and variable
            // names come from identifiers.
            return BooleanFunction::var(name, width).unwrap();
        }
        return BooleanFunction::constant(arbitrary_values(rng, width, false)).unwrap();
    }
    let lhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
    // Unwrapping is safe since both operands have the same non-zero width.
    match rng.gen_range(0..7) {
        0 => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::and(&lhs, &rhs, width).unwrap()
        }
        1 => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::or(&lhs, &rhs, width).unwrap()
        }
        2 => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::xor(&lhs, &rhs, width).unwrap()
        }
        3 => BooleanFunction::not(&lhs, width).unwrap(),
        4 => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::add(&lhs, &rhs, width).unwrap()
        }
        5 => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::sub(&lhs, &rhs, width).unwrap()
        }
        _ => {
            let rhs = arbitrary_boolean_function(rng, variables, width, depth - 1);
            BooleanFunction::mul(&lhs, &rhs, width).unwrap()
        }
    }
}
