// SPDX-License-Identifier: Apache-2.0

//! Structural validation for postfix node lists.
//!
//! Validation makes two guarantees: the node list obeys stack discipline
//! (every operator finds its operands, and exactly one expression remains at
//! the end), and every node's declared width is consistent with its operator
//! and operands. All construction paths funnel through [`validate_nodes`].

use std::collections::HashMap;

use crate::bf::{BooleanFunction, Node, NodePayload, Op, op_to_operator};

/// Errors that can arise while validating a postfix node list.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A node declares width zero.
    ZeroWidth { index: usize },
    /// A constant's digit count differs from its declared width.
    ConstantWidthMismatch {
        index: usize,
        width: usize,
        digits: usize,
    },
    /// A constant value does not fit in the requested width.
    ConstantOutOfRange { value: u64, width: usize },
    /// A variable's name is not an identifier the text format can express.
    InvalidVariableName { index: usize, name: String },
    /// The same variable name is used with two different widths.
    InconsistentVariableWidth {
        name: String,
        width: usize,
        other_width: usize,
    },
    /// An operator appears before enough operands are available.
    StackUnderflow {
        index: usize,
        operator: String,
        available: usize,
        needed: usize,
    },
    /// The node list leaves more than one expression on the stack.
    UnbalancedStack { remaining: usize },
    /// An index node appears where an expression operand is required.
    UnexpectedIndexOperand { index: usize, operator: String },
    /// A slice bound or extension width position holds a non-index node.
    ExpectedIndexOperand { index: usize, operator: String },
    /// An operator's operand widths disagree.
    OperandWidthMismatch {
        index: usize,
        operator: String,
        expected: usize,
        got: usize,
    },
    /// An operator's declared width disagrees with what its operands imply.
    ResultWidthMismatch {
        index: usize,
        operator: String,
        expected: usize,
        got: usize,
    },
    /// An ite condition must be a single digit wide.
    IteConditionWidth { index: usize, width: usize },
    /// Slice bounds must satisfy start <= end < operand width.
    SliceBounds {
        index: usize,
        start: usize,
        end: usize,
        width: usize,
    },
    /// An index node's declared width does not match its role.
    IndexWidthMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
    /// An extension's target width is narrower than its operand.
    ExtensionNarrows {
        index: usize,
        operand_width: usize,
        target_width: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroWidth { index } => {
                write!(f, "node {} has zero width", index)
            }
            ValidationError::ConstantWidthMismatch {
                index,
                width,
                digits,
            } => {
                write!(
                    f,
                    "node {} declares width {} but its constant has {} digit(s)",
                    index, width, digits
                )
            }
            ValidationError::ConstantOutOfRange { value, width } => {
                write!(f, "constant {} does not fit in {} digit(s)", value, width)
            }
            ValidationError::InvalidVariableName { index, name } => {
                write!(f, "node {} has invalid variable name {:?}", index, name)
            }
            ValidationError::InconsistentVariableWidth {
                name,
                width,
                other_width,
            } => {
                write!(
                    f,
                    "variable '{}' is used with width {} and width {}",
                    name, width, other_width
                )
            }
            ValidationError::StackUnderflow {
                index,
                operator,
                available,
                needed,
            } => {
                write!(
                    f,
                    "node {} operator '{}' needs {} operand(s), stack has {}",
                    index, operator, needed, available
                )
            }
            ValidationError::UnbalancedStack { remaining } => {
                write!(
                    f,
                    "node list leaves {} expressions on the stack; expected exactly 1",
                    remaining
                )
            }
            ValidationError::UnexpectedIndexOperand { index, operator } => {
                write!(
                    f,
                    "node {} is an index but operator '{}' requires an expression operand",
                    index, operator
                )
            }
            ValidationError::ExpectedIndexOperand { index, operator } => {
                write!(
                    f,
                    "node {} must be an index operand of '{}'",
                    index, operator
                )
            }
            ValidationError::OperandWidthMismatch {
                index,
                operator,
                expected,
                got,
            } => {
                write!(
                    f,
                    "node {} operator '{}' has operand width mismatch: {} vs {}",
                    index, operator, expected, got
                )
            }
            ValidationError::ResultWidthMismatch {
                index,
                operator,
                expected,
                got,
            } => {
                write!(
                    f,
                    "node {} operator '{}' result width mismatch: expected {}, got {}",
                    index, operator, expected, got
                )
            }
            ValidationError::IteConditionWidth { index, width } => {
                write!(
                    f,
                    "node {} ite condition must be 1 digit wide; got {}",
                    index, width
                )
            }
            ValidationError::SliceBounds {
                index,
                start,
                end,
                width,
            } => {
                write!(
                    f,
                    "node {} slice bounds [{}, {}] are invalid for operand width {}",
                    index, start, end, width
                )
            }
            ValidationError::IndexWidthMismatch {
                index,
                expected,
                got,
            } => {
                write!(
                    f,
                    "node {} index width mismatch: expected {}, got {}",
                    index, expected, got
                )
            }
            ValidationError::ExtensionNarrows {
                index,
                operand_width,
                target_width,
            } => {
                write!(
                    f,
                    "node {} extends a width-{} operand to narrower width {}",
                    index, operand_width, target_width
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// True for names the text format can express: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates a postfix node list: stack discipline plus the per-operator
/// width rules. The empty list is allowed and denotes the empty function.
pub fn validate_nodes(nodes: &[Node]) -> Result<(), ValidationError> {
    let mut variable_widths: HashMap<&str, usize> = HashMap::new();
    // Indices of the top node of each completed subexpression.
    let mut stack: Vec<usize> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if node.size == 0 {
            return Err(ValidationError::ZeroWidth { index: i });
        }
        match &node.payload {
            NodePayload::Constant(values) => {
                if values.len() != node.size {
                    return Err(ValidationError::ConstantWidthMismatch {
                        index: i,
                        width: node.size,
                        digits: values.len(),
                    });
                }
            }
            NodePayload::Index(_) => {}
            NodePayload::Variable(name) => {
                // `bits` is reserved by the literal grammar.
                if !is_valid_identifier_name(name) || name == "bits" {
                    return Err(ValidationError::InvalidVariableName {
                        index: i,
                        name: name.clone(),
                    });
                }
                match variable_widths.get(name.as_str()) {
                    Some(&width) if width != node.size => {
                        return Err(ValidationError::InconsistentVariableWidth {
                            name: name.clone(),
                            width,
                            other_width: node.size,
                        });
                    }
                    Some(_) => {}
                    None => {
                        variable_widths.insert(name.as_str(), node.size);
                    }
                }
            }
            NodePayload::Op(op) => {
                let needed = op.get_arity();
                if stack.len() < needed {
                    return Err(ValidationError::StackUnderflow {
                        index: i,
                        operator: op_to_operator(*op).to_string(),
                        available: stack.len(),
                        needed,
                    });
                }
                let at = stack.len() - needed;
                // Left-to-right operand order.
                let operands = stack.split_off(at);
                validate_op(nodes, i, *op, &operands)?;
            }
        }
        stack.push(i);
    }
    // An empty input leaves an empty stack; anything else must reduce to a
    // single expression.
    if !nodes.is_empty() && stack.len() != 1 {
        return Err(ValidationError::UnbalancedStack {
            remaining: stack.len(),
        });
    }
    Ok(())
}

/// Re-checks a built function against the structural invariants. `build`
/// already validates, so this mostly serves assertions in tests and
/// debugging aids.
pub fn validate_function(f: &BooleanFunction) -> Result<(), ValidationError> {
    validate_nodes(f.nodes())
}

fn require_expression(
    nodes: &[Node],
    operand: usize,
    op: Op,
) -> Result<&Node, ValidationError> {
    let node = &nodes[operand];
    if node.is_index() {
        return Err(ValidationError::UnexpectedIndexOperand {
            index: operand,
            operator: op_to_operator(op).to_string(),
        });
    }
    Ok(node)
}

fn require_index(nodes: &[Node], operand: usize, op: Op) -> Result<usize, ValidationError> {
    match &nodes[operand].payload {
        NodePayload::Index(value) => Ok(*value),
        _ => Err(ValidationError::ExpectedIndexOperand {
            index: operand,
            operator: op_to_operator(op).to_string(),
        }),
    }
}

fn validate_op(
    nodes: &[Node],
    index: usize,
    op: Op,
    operands: &[usize],
) -> Result<(), ValidationError> {
    let node = &nodes[index];
    let operator = || op_to_operator(op).to_string();
    match op {
        Op::Not => {
            let operand = require_expression(nodes, operands[0], op)?;
            if node.size != operand.size {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected: operand.size,
                    got: node.size,
                });
            }
        }
        Op::And
        | Op::Or
        | Op::Xor
        | Op::Add
        | Op::Sub
        | Op::Mul
        | Op::Sdiv
        | Op::Udiv
        | Op::Srem
        | Op::Urem => {
            let lhs = require_expression(nodes, operands[0], op)?;
            let rhs = require_expression(nodes, operands[1], op)?;
            if lhs.size != rhs.size {
                return Err(ValidationError::OperandWidthMismatch {
                    index,
                    operator: operator(),
                    expected: lhs.size,
                    got: rhs.size,
                });
            }
            if node.size != lhs.size {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected: lhs.size,
                    got: node.size,
                });
            }
        }
        Op::Concat => {
            let lhs = require_expression(nodes, operands[0], op)?;
            let rhs = require_expression(nodes, operands[1], op)?;
            let expected = lhs.size + rhs.size;
            if node.size != expected {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected,
                    got: node.size,
                });
            }
        }
        Op::Eq | Op::Sle | Op::Slt | Op::Ule | Op::Ult => {
            let lhs = require_expression(nodes, operands[0], op)?;
            let rhs = require_expression(nodes, operands[1], op)?;
            if lhs.size != rhs.size {
                return Err(ValidationError::OperandWidthMismatch {
                    index,
                    operator: operator(),
                    expected: lhs.size,
                    got: rhs.size,
                });
            }
            if node.size != 1 {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected: 1,
                    got: node.size,
                });
            }
        }
        Op::Slice => {
            let operand = require_expression(nodes, operands[0], op)?;
            let start = require_index(nodes, operands[1], op)?;
            let end = require_index(nodes, operands[2], op)?;
            for bound in [operands[1], operands[2]] {
                if nodes[bound].size != operand.size {
                    return Err(ValidationError::IndexWidthMismatch {
                        index: bound,
                        expected: operand.size,
                        got: nodes[bound].size,
                    });
                }
            }
            if start > end || end >= operand.size {
                return Err(ValidationError::SliceBounds {
                    index,
                    start,
                    end,
                    width: operand.size,
                });
            }
            let expected = end - start + 1;
            if node.size != expected {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected,
                    got: node.size,
                });
            }
        }
        Op::Zext | Op::Sext => {
            let operand = require_expression(nodes, operands[0], op)?;
            let target = require_index(nodes, operands[1], op)?;
            if nodes[operands[1]].size != target {
                return Err(ValidationError::IndexWidthMismatch {
                    index: operands[1],
                    expected: target,
                    got: nodes[operands[1]].size,
                });
            }
            if node.size != target {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected: target,
                    got: node.size,
                });
            }
            if target < operand.size {
                return Err(ValidationError::ExtensionNarrows {
                    index,
                    operand_width: operand.size,
                    target_width: target,
                });
            }
        }
        Op::Ite => {
            let cond = require_expression(nodes, operands[0], op)?;
            let on_true = require_expression(nodes, operands[1], op)?;
            let on_false = require_expression(nodes, operands[2], op)?;
            if cond.size != 1 {
                return Err(ValidationError::IteConditionWidth {
                    index,
                    width: cond.size,
                });
            }
            if on_true.size != on_false.size {
                return Err(ValidationError::OperandWidthMismatch {
                    index,
                    operator: operator(),
                    expected: on_true.size,
                    got: on_false.size,
                });
            }
            if node.size != on_true.size {
                return Err(ValidationError::ResultWidthMismatch {
                    index,
                    operator: operator(),
                    expected: on_true.size,
                    got: node.size,
                });
            }
        }
    }
    Ok(())
}
