// SPDX-License-Identifier: Apache-2.0

//! Variable renaming and variable-to-subexpression replacement.
//!
//! Replacement splices the replacement's postfix nodes directly over each
//! variable occurrence, so no tree rebuilding is involved. [`substitute_map`]
//! walks the original node list exactly once; spliced nodes are never
//! re-examined, so a map like `{a -> b, b -> a}` swaps the two variables
//! instead of collapsing them.

use std::collections::HashMap;

use crate::bf::{BooleanFunction, Node, NodePayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstituteError {
    /// A replacement's width differs from the declared width of the
    /// variable occurrence it would replace.
    ReplacementSizeMismatch {
        name: String,
        variable_size: usize,
        replacement_size: usize,
    },
    /// A replacement for an occurring variable is the empty function.
    EmptyReplacement { name: String },
    /// The spliced result would use one variable name at two widths, e.g.
    /// a replacement whose free variable already occurs in the target at a
    /// different width.
    VariableWidthConflict {
        name: String,
        width: usize,
        other_width: usize,
    },
}

impl std::fmt::Display for SubstituteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstituteError::ReplacementSizeMismatch {
                name,
                variable_size,
                replacement_size,
            } => write!(
                f,
                "replacement for variable '{}' has width {}; the variable is declared with width {}",
                name, replacement_size, variable_size
            ),
            SubstituteError::EmptyReplacement { name } => {
                write!(f, "replacement for variable '{}' is the empty function", name)
            }
            SubstituteError::VariableWidthConflict {
                name,
                width,
                other_width,
            } => write!(
                f,
                "substitution would use variable '{}' with widths {} and {}",
                name, width, other_width
            ),
        }
    }
}

impl std::error::Error for SubstituteError {}

/// Renames every occurrence of `old_name` to `new_name`; widths and
/// structure are untouched, so this always succeeds. Renaming onto a name
/// that already occurs at a different width leaves the function
/// width-inconsistent; debug builds assert against that misuse.
pub fn substitute_variable(
    f: &BooleanFunction,
    old_name: &str,
    new_name: &str,
) -> BooleanFunction {
    let nodes = f
        .nodes()
        .iter()
        .map(|node| match &node.payload {
            NodePayload::Variable(name) if name == old_name => Node {
                size: node.size,
                payload: NodePayload::Variable(new_name.to_string()),
            },
            _ => node.clone(),
        })
        .collect();
    BooleanFunction::from_validated_nodes(nodes)
}

/// Replaces every occurrence of variable `name` with a copy of
/// `replacement`. A name that never occurs leaves the function unchanged,
/// in which case the replacement is not inspected at all.
pub fn substitute(
    f: &BooleanFunction,
    name: &str,
    replacement: &BooleanFunction,
) -> Result<BooleanFunction, SubstituteError> {
    let mut replacements = HashMap::with_capacity(1);
    replacements.insert(name.to_string(), replacement.clone());
    substitute_map(f, &replacements)
}

/// Applies all replacements simultaneously in one pass over the original
/// node list. Fails atomically: the first ill-sized or width-conflicting
/// occurrence errors out and nothing partial is produced.
pub fn substitute_map(
    f: &BooleanFunction,
    replacements: &HashMap<String, BooleanFunction>,
) -> Result<BooleanFunction, SubstituteError> {
    let mut nodes: Vec<Node> = Vec::with_capacity(f.len());
    let mut widths: HashMap<&str, usize> = HashMap::new();
    let mut spliced = 0usize;
    for node in f.nodes() {
        let name = match &node.payload {
            NodePayload::Variable(name) => name,
            _ => {
                nodes.push(node.clone());
                continue;
            }
        };
        match replacements.get(name.as_str()) {
            Some(replacement) => {
                check_replacement(name, node.size, replacement)?;
                for spliced_node in replacement.nodes() {
                    if let NodePayload::Variable(inner) = &spliced_node.payload {
                        record_width(&mut widths, inner, spliced_node.size)?;
                    }
                    nodes.push(spliced_node.clone());
                }
                spliced += 1;
            }
            None => {
                record_width(&mut widths, name, node.size)?;
                nodes.push(node.clone());
            }
        }
    }
    if spliced > 0 {
        log::debug!(
            "substitute: spliced {} occurrence(s); {} -> {} node(s)",
            spliced,
            f.len(),
            nodes.len()
        );
    }
    Ok(BooleanFunction::from_validated_nodes(nodes))
}

fn check_replacement(
    name: &str,
    variable_size: usize,
    replacement: &BooleanFunction,
) -> Result<(), SubstituteError> {
    if replacement.is_empty() {
        return Err(SubstituteError::EmptyReplacement {
            name: name.to_string(),
        });
    }
    if replacement.size() != variable_size {
        return Err(SubstituteError::ReplacementSizeMismatch {
            name: name.to_string(),
            variable_size,
            replacement_size: replacement.size(),
        });
    }
    Ok(())
}

fn record_width<'a>(
    widths: &mut HashMap<&'a str, usize>,
    name: &'a str,
    size: usize,
) -> Result<(), SubstituteError> {
    match widths.insert(name, size) {
        Some(previous) if previous != size => Err(SubstituteError::VariableWidthConflict {
            name: name.to_string(),
            width: previous,
            other_width: size,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bf_eval::evaluate_bits;
    use crate::value::values_from_u64;
    use pretty_assertions::assert_eq;

    fn var(name: &str, size: usize) -> BooleanFunction {
        BooleanFunction::var(name, size).unwrap()
    }

    #[test]
    fn test_rename() {
        let f = BooleanFunction::and(&var("a", 1), &var("b", 1), 1).unwrap();
        let renamed = substitute_variable(&f, "a", "c");
        assert_eq!(renamed.to_string(), "(c & b)");
        assert_eq!(renamed.get_variable_names(), vec!["b", "c"]);
        // Renaming a name that never occurs is a no-op.
        assert_eq!(substitute_variable(&f, "z", "w"), f);
    }

    #[test]
    fn test_single_substitution() {
        let f = BooleanFunction::xor(&var("a", 1), &var("b", 1), 1).unwrap();
        let g = BooleanFunction::and(&var("c", 1), &var("d", 1), 1).unwrap();
        let spliced = substitute(&f, "a", &g).unwrap();
        assert_eq!(spliced.to_string(), "((c & d) ^ b)");
        assert_eq!(spliced.len(), f.len() + g.len() - 1);
    }

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let x = var("x", 1);
        let f = BooleanFunction::and(&x, &x, 1).unwrap();
        let g = BooleanFunction::or(&var("p", 1), &var("q", 1), 1).unwrap();
        let spliced = substitute(&f, "x", &g).unwrap();
        assert_eq!(spliced.to_string(), "((p | q) & (p | q))");
        assert_eq!(spliced.len(), 2 * g.len() + 1);
    }

    #[test]
    fn test_size_mismatch() {
        let f = BooleanFunction::add(&var("a", 4), &var("b", 4), 4).unwrap();
        let narrow = var("c", 2);
        let result = substitute(&f, "a", &narrow);
        assert_eq!(
            result,
            Err(SubstituteError::ReplacementSizeMismatch {
                name: "a".to_string(),
                variable_size: 4,
                replacement_size: 2,
            })
        );
    }

    #[test]
    fn test_empty_replacement() {
        let f = var("a", 1);
        let result = substitute(&f, "a", &BooleanFunction::default());
        assert!(matches!(
            result,
            Err(SubstituteError::EmptyReplacement { .. })
        ));
    }

    #[test]
    fn test_absent_name_is_vacuous() {
        let f = var("a", 4);
        // The replacement is never inspected when the name does not occur,
        // so even an ill-sized one passes.
        let spliced = substitute(&f, "zzz", &var("c", 2)).unwrap();
        assert_eq!(spliced, f);
    }

    #[test]
    fn test_simultaneous_swap() {
        let f = BooleanFunction::and(&var("a", 1), &var("b", 1), 1).unwrap();
        let mut map = HashMap::new();
        map.insert("a".to_string(), var("b", 1));
        map.insert("b".to_string(), var("a", 1));
        let swapped = substitute_map(&f, &map).unwrap();
        assert_eq!(swapped.to_string(), "(b & a)");
    }

    #[test]
    fn test_atomic_failure() {
        let f = BooleanFunction::and(&var("a", 1), &var("b", 1), 1).unwrap();
        let mut map = HashMap::new();
        map.insert("a".to_string(), var("c", 1));
        map.insert("b".to_string(), var("d", 3));
        assert!(matches!(
            substitute_map(&f, &map),
            Err(SubstituteError::ReplacementSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_width_conflict_across_replacement() {
        let f = BooleanFunction::add(&var("a", 4), &var("b", 4), 4).unwrap();
        // Replacement reuses name "a" at width 2 while the target keeps it
        // at width 4.
        let narrow_a = var("a", 2);
        let g = BooleanFunction::concat(&narrow_a, &narrow_a, 4).unwrap();
        let result = substitute(&f, "b", &g);
        assert!(matches!(
            result,
            Err(SubstituteError::VariableWidthConflict {
                ref name,
                ..
            }) if name == "a"
        ));
    }

    #[test]
    fn test_substitution_soundness() {
        let _ = env_logger::builder().is_test(true).try_init();
        // f = x + y, g = u * v; substituting then evaluating must agree
        // with evaluating g first and binding x to the result.
        let f = BooleanFunction::add(&var("x", 4), &var("y", 4), 4).unwrap();
        let g = BooleanFunction::mul(&var("u", 4), &var("v", 4), 4).unwrap();
        let spliced = substitute(&f, "x", &g).unwrap();

        let mut env = HashMap::new();
        env.insert("u".to_string(), values_from_u64(3, 4).unwrap());
        env.insert("v".to_string(), values_from_u64(2, 4).unwrap());
        env.insert("y".to_string(), values_from_u64(5, 4).unwrap());
        let direct = evaluate_bits(&spliced, &env).unwrap();

        let g_value = evaluate_bits(&g, &env).unwrap();
        env.insert("x".to_string(), g_value);
        let staged = evaluate_bits(&f, &env).unwrap();
        assert_eq!(direct, staged);
        assert_eq!(direct, values_from_u64(11, 4).unwrap());
    }
}
