// SPDX-License-Identifier: Apache-2.0

//! Rewriting-based simplification.
//!
//! [`simplify_local`] makes one bottom-up pass over the postfix sequence,
//! rewriting each operator against its already-rewritten operand fragments;
//! [`simplify`] repeats that until the sequence stops changing. Every rewrite
//! strictly reduces the node count, so the fixed point is reached in at most
//! as many passes as there are nodes.
//!
//! Constant folding delegates to the evaluator's kernels, so folding a
//! constant subexpression and evaluating it are observably the same
//! operation (a folded division by zero becomes the all-`X` constant, for
//! example). The algebraic identities (`x - x`, `eq(x, x)`, ...) hold
//! exactly for Boolean assignments; under unknown-valued assignments they
//! may produce a more defined result than direct evaluation, which never
//! tracks that both sides are the same expression.

use crate::bf::{BooleanFunction, Node, NodePayload, Op};
use crate::bf_eval;
use crate::value::{self, Value};

/// Repeats [`simplify_local`] to a fixed point.
pub fn simplify(f: &BooleanFunction) -> BooleanFunction {
    let mut current = simplify_local(f);
    let mut passes = 1;
    loop {
        let next = simplify_local(&current);
        if next == current {
            log::debug!(
                "simplify: fixed point after {} pass(es); {} -> {} node(s)",
                passes,
                f.len(),
                next.len()
            );
            return next;
        }
        current = next;
        passes += 1;
    }
}

/// One bottom-up rewrite pass. Inner rewrites are visible to the operators
/// above them within the same pass.
pub fn simplify_local(f: &BooleanFunction) -> BooleanFunction {
    let mut stack: Vec<Vec<Node>> = Vec::new();
    for node in f.nodes() {
        match &node.payload {
            NodePayload::Op(op) => {
                let at = stack.len() - node.get_arity();
                let operands = stack.split_off(at);
                stack.push(rewrite_op(node, *op, operands));
            }
            _ => stack.push(vec![node.clone()]),
        }
    }
    match stack.pop() {
        Some(nodes) => BooleanFunction::from_validated_nodes(nodes),
        None => BooleanFunction::default(),
    }
}

fn single_constant(fragment: &[Node]) -> Option<&[Value]> {
    match fragment {
        [node] => match &node.payload {
            NodePayload::Constant(values) => Some(values),
            _ => None,
        },
        _ => None,
    }
}

fn fragment_is_all_zeros(fragment: &[Node]) -> bool {
    single_constant(fragment).is_some_and(value::all_zeros)
}

fn fragment_is_all_ones(fragment: &[Node]) -> bool {
    single_constant(fragment).is_some_and(value::all_ones)
}

/// True for the numeric constant 1 at any width.
fn fragment_is_one(fragment: &[Node]) -> bool {
    single_constant(fragment).is_some_and(|values| {
        values[0] == Value::One && values[1..].iter().all(|v| *v == Value::Zero)
    })
}

fn constant_fragment(values: Vec<Value>) -> Vec<Node> {
    vec![Node {
        size: values.len(),
        payload: NodePayload::Constant(values),
    }]
}

fn zeros_fragment(width: usize) -> Vec<Node> {
    constant_fragment(vec![Value::Zero; width])
}

fn append_not(mut fragment: Vec<Node>, size: usize) -> Vec<Node> {
    fragment.push(Node {
        size,
        payload: NodePayload::Op(Op::Not),
    });
    fragment
}

fn slice_bound(fragment: &[Node]) -> usize {
    fragment[0]
        .get_index_value()
        .expect("validated slice carries index bounds")
}

fn fragment_width(fragment: &[Node]) -> usize {
    fragment.last().expect("fragments are non-empty").size
}

/// Folds operators whose expression operands are all single constants; the
/// structural index operands of slice/zext/sext are exempt. Ite is handled
/// by its condition rules instead.
fn fold_constant_operands(node: &Node, op: Op, operands: &[Vec<Node>]) -> Option<Vec<Value>> {
    match op {
        Op::And | Op::Or | Op::Xor => {
            let lhs = single_constant(&operands[0])?;
            let rhs = single_constant(&operands[1])?;
            Some(bf_eval::eval_bitwise(op, lhs, rhs))
        }
        Op::Not => Some(bf_eval::eval_not(single_constant(&operands[0])?)),
        Op::Add | Op::Sub | Op::Mul | Op::Sdiv | Op::Udiv | Op::Srem | Op::Urem => {
            let lhs = single_constant(&operands[0])?;
            let rhs = single_constant(&operands[1])?;
            Some(bf_eval::eval_arith(op, lhs, rhs))
        }
        Op::Eq | Op::Sle | Op::Slt | Op::Ule | Op::Ult => {
            let lhs = single_constant(&operands[0])?;
            let rhs = single_constant(&operands[1])?;
            Some(bf_eval::eval_comparison(op, lhs, rhs))
        }
        Op::Concat => {
            let lhs = single_constant(&operands[0])?;
            let rhs = single_constant(&operands[1])?;
            Some(bf_eval::eval_concat(lhs, rhs))
        }
        Op::Slice => {
            let values = single_constant(&operands[0])?;
            Some(bf_eval::eval_slice(
                values,
                slice_bound(&operands[1]),
                slice_bound(&operands[2]),
            ))
        }
        Op::Zext => Some(bf_eval::eval_zext(
            single_constant(&operands[0])?,
            node.size,
        )),
        Op::Sext => Some(bf_eval::eval_sext(
            single_constant(&operands[0])?,
            node.size,
        )),
        Op::Ite => None,
    }
}

/// Applies the first matching rewrite for `node` against its operand
/// fragments, or rebuilds the operator unchanged. Every rewrite returns a
/// fragment with the same width and strictly fewer nodes.
fn rewrite_op(node: &Node, op: Op, mut operands: Vec<Vec<Node>>) -> Vec<Node> {
    if let Some(values) = fold_constant_operands(node, op, &operands) {
        log::trace!("fold {} node to constant", op);
        return constant_fragment(values);
    }

    match op {
        Op::And => {
            if fragment_is_all_zeros(&operands[0]) || fragment_is_all_zeros(&operands[1]) {
                return zeros_fragment(node.size);
            }
            if fragment_is_all_ones(&operands[0]) {
                return operands.swap_remove(1);
            }
            if fragment_is_all_ones(&operands[1]) {
                return operands.swap_remove(0);
            }
            if operands[0] == operands[1] {
                return operands.swap_remove(0);
            }
        }
        Op::Or => {
            if fragment_is_all_ones(&operands[0]) || fragment_is_all_ones(&operands[1]) {
                return constant_fragment(vec![Value::One; node.size]);
            }
            if fragment_is_all_zeros(&operands[0]) {
                return operands.swap_remove(1);
            }
            if fragment_is_all_zeros(&operands[1]) {
                return operands.swap_remove(0);
            }
            if operands[0] == operands[1] {
                return operands.swap_remove(0);
            }
        }
        Op::Xor => {
            if operands[0] == operands[1] {
                return zeros_fragment(node.size);
            }
            if fragment_is_all_zeros(&operands[0]) {
                return operands.swap_remove(1);
            }
            if fragment_is_all_zeros(&operands[1]) {
                return operands.swap_remove(0);
            }
            if fragment_is_all_ones(&operands[0]) {
                return append_not(operands.swap_remove(1), node.size);
            }
            if fragment_is_all_ones(&operands[1]) {
                return append_not(operands.swap_remove(0), node.size);
            }
        }
        Op::Not => {
            let doubled = matches!(
                operands[0].last().map(|n| &n.payload),
                Some(NodePayload::Op(Op::Not))
            );
            if doubled {
                let mut fragment = operands.swap_remove(0);
                fragment.pop();
                return fragment;
            }
        }
        Op::Add => {
            if fragment_is_all_zeros(&operands[0]) {
                return operands.swap_remove(1);
            }
            if fragment_is_all_zeros(&operands[1]) {
                return operands.swap_remove(0);
            }
        }
        Op::Sub => {
            if fragment_is_all_zeros(&operands[1]) {
                return operands.swap_remove(0);
            }
            if operands[0] == operands[1] {
                return zeros_fragment(node.size);
            }
        }
        Op::Mul => {
            if fragment_is_all_zeros(&operands[0]) || fragment_is_all_zeros(&operands[1]) {
                return zeros_fragment(node.size);
            }
            if fragment_is_one(&operands[0]) {
                return operands.swap_remove(1);
            }
            if fragment_is_one(&operands[1]) {
                return operands.swap_remove(0);
            }
        }
        Op::Sdiv | Op::Udiv => {
            if fragment_is_one(&operands[1]) {
                return operands.swap_remove(0);
            }
        }
        Op::Srem | Op::Urem => {
            if fragment_is_one(&operands[1]) {
                return zeros_fragment(node.size);
            }
        }
        Op::Eq | Op::Ule | Op::Sle => {
            if operands[0] == operands[1] {
                return constant_fragment(vec![Value::One]);
            }
        }
        Op::Ult | Op::Slt => {
            if operands[0] == operands[1] {
                return constant_fragment(vec![Value::Zero]);
            }
        }
        Op::Concat => {}
        Op::Slice => {
            let start = slice_bound(&operands[1]);
            let end = slice_bound(&operands[2]);
            if start == 0 && end + 1 == fragment_width(&operands[0]) {
                return operands.swap_remove(0);
            }
        }
        Op::Zext | Op::Sext => {
            if node.size == fragment_width(&operands[0]) {
                return operands.swap_remove(0);
            }
        }
        Op::Ite => {
            let cond_digit = single_constant(&operands[0]).map(|values| values[0]);
            if let Some(digit) = cond_digit {
                return match digit {
                    Value::One => operands.swap_remove(1),
                    Value::Zero => operands.swap_remove(2),
                    _ => constant_fragment(bf_eval::all_x(node.size)),
                };
            }
            if operands[1] == operands[2] {
                return operands.swap_remove(1);
            }
        }
    }

    let mut nodes = Vec::with_capacity(operands.iter().map(Vec::len).sum::<usize>() + 1);
    for fragment in operands {
        nodes.extend(fragment);
    }
    nodes.push(node.clone());
    nodes
}
