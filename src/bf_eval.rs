// SPDX-License-Identifier: Apache-2.0

//! Concrete evaluation under four-state semantics, plus truth-table
//! enumeration.
//!
//! Bitwise operators resolve as much as a dominating digit allows (`0` wins
//! an and, `1` wins an or); everything else is conservative: an `X` or `Z`
//! digit anywhere in an arithmetic, division or comparison operand makes the
//! whole result `X`. `Z` never survives an operator, it degrades to `X` on
//! first contact.
//!
//! Arithmetic is two's complement at the declared width, computed digit by
//! digit so widths beyond 64 behave the same as narrow ones.

use std::collections::HashMap;

use crate::bf::{BooleanFunction, NodePayload, Op};
use crate::value::{self, Value};

/// Upper bound on distinct variables a truth table enumerates (2^10 rows).
pub const MAX_TRUTH_TABLE_VARIABLES: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub enum EvalError {
    /// The empty function has no value.
    EmptyFunction,
    /// A variable had no binding in the environment.
    UnboundVariable { name: String },
    /// A binding's width differs from the variable's declared width.
    BindingWidthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Single-digit evaluation was asked of a function with a wide variable.
    NonBooleanVariable { name: String, width: usize },
    /// Single-digit evaluation was asked of a function with a wide result.
    NonBooleanResult { width: usize },
    /// An index node was evaluated outside a slice/zext/sext position.
    StrayIndexNode { index: usize },
    /// The truth table would need more variables than the supported maximum.
    TooManyVariables { count: usize, limit: usize },
    /// The requested variable order does not cover a function variable.
    MissingVariable { name: String },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::EmptyFunction => {
                write!(f, "cannot evaluate the empty function")
            }
            EvalError::UnboundVariable { name } => {
                write!(f, "variable '{}' has no binding", name)
            }
            EvalError::BindingWidthMismatch {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "binding for '{}' has width {}; variable declares width {}",
                    name, got, expected
                )
            }
            EvalError::NonBooleanVariable { name, width } => {
                write!(
                    f,
                    "variable '{}' has width {}; single-digit evaluation needs width 1",
                    name, width
                )
            }
            EvalError::NonBooleanResult { width } => {
                write!(
                    f,
                    "function produces width {}; single-digit evaluation needs width 1",
                    width
                )
            }
            EvalError::StrayIndexNode { index } => {
                write!(
                    f,
                    "node {} is an index and has no value of its own",
                    index
                )
            }
            EvalError::TooManyVariables { count, limit } => {
                write!(
                    f,
                    "truth table over {} variables exceeds the limit of {}",
                    count, limit
                )
            }
            EvalError::MissingVariable { name } => {
                write!(
                    f,
                    "variable order does not include function variable '{}'",
                    name
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}

// -- Digit-level kernels ----------------------------------------------------
//
// These are shared with constant folding so that simplifying a constant
// subexpression and evaluating it are observably the same operation.

fn lane_and(a: Value, b: Value) -> Value {
    if a == Value::Zero || b == Value::Zero {
        Value::Zero
    } else if a == Value::One && b == Value::One {
        Value::One
    } else {
        Value::X
    }
}

fn lane_or(a: Value, b: Value) -> Value {
    if a == Value::One || b == Value::One {
        Value::One
    } else if a == Value::Zero && b == Value::Zero {
        Value::Zero
    } else {
        Value::X
    }
}

fn lane_xor(a: Value, b: Value) -> Value {
    if a.is_known() && b.is_known() {
        Value::from_bool(a != b)
    } else {
        Value::X
    }
}

fn lane_not(a: Value) -> Value {
    match a {
        Value::Zero => Value::One,
        Value::One => Value::Zero,
        _ => Value::X,
    }
}

pub(crate) fn all_x(width: usize) -> Vec<Value> {
    vec![Value::X; width]
}

pub(crate) fn eval_bitwise(op: Op, lhs: &[Value], rhs: &[Value]) -> Vec<Value> {
    let lane = match op {
        Op::And => lane_and,
        Op::Or => lane_or,
        Op::Xor => lane_xor,
        _ => panic!("eval_bitwise called with {}", op),
    };
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| lane(*a, *b))
        .collect()
}

pub(crate) fn eval_not(operand: &[Value]) -> Vec<Value> {
    operand.iter().map(|v| lane_not(*v)).collect()
}

fn to_bools(values: &[Value]) -> Vec<bool> {
    values.iter().map(|v| *v == Value::One).collect()
}

fn from_bools(bits: &[bool]) -> Vec<Value> {
    bits.iter().map(|b| Value::from_bool(*b)).collect()
}

fn add_bits(a: &[bool], b: &[bool], mut carry: bool) -> Vec<bool> {
    let mut out = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        let partial = a[i] ^ b[i];
        out.push(partial ^ carry);
        carry = (a[i] & b[i]) | (partial & carry);
    }
    out
}

fn negate_bits(a: &[bool]) -> Vec<bool> {
    let flipped: Vec<bool> = a.iter().map(|x| !x).collect();
    add_bits(&flipped, &vec![false; a.len()], true)
}

fn mul_bits(a: &[bool], b: &[bool]) -> Vec<bool> {
    let n = a.len();
    let mut acc = vec![false; n];
    for i in 0..n {
        if b[i] {
            let mut shifted = vec![false; n];
            for j in 0..n - i {
                shifted[i + j] = a[j];
            }
            acc = add_bits(&acc, &shifted, false);
        }
    }
    acc
}

fn is_zero_bits(a: &[bool]) -> bool {
    a.iter().all(|x| !x)
}

fn sign_bit(a: &[bool]) -> bool {
    *a.last().expect("bit vectors are non-empty")
}

fn abs_bits(a: &[bool]) -> Vec<bool> {
    if sign_bit(a) { negate_bits(a) } else { a.to_vec() }
}

fn ult_bits(a: &[bool], b: &[bool]) -> bool {
    for i in (0..a.len()).rev() {
        if a[i] != b[i] {
            return b[i];
        }
    }
    false
}

fn slt_bits(a: &[bool], b: &[bool]) -> bool {
    let sa = sign_bit(a);
    let sb = sign_bit(b);
    if sa != sb { sa } else { ult_bits(a, b) }
}

/// Restoring long division; the caller guarantees a non-zero divisor. The
/// remainder register runs one digit wide of the operands so the shifted-in
/// digit never overflows.
fn udivrem_bits(a: &[bool], b: &[bool]) -> (Vec<bool>, Vec<bool>) {
    let n = a.len();
    let mut quotient = vec![false; n];
    let mut remainder = vec![false; n + 1];
    let b_wide: Vec<bool> = b.iter().copied().chain(std::iter::once(false)).collect();
    let b_wide_flipped: Vec<bool> = b_wide.iter().map(|x| !x).collect();
    for i in (0..n).rev() {
        remainder.insert(0, a[i]);
        remainder.truncate(n + 1);
        if !ult_bits(&remainder, &b_wide) {
            remainder = add_bits(&remainder, &b_wide_flipped, true);
            quotient[i] = true;
        }
    }
    remainder.truncate(n);
    (quotient, remainder)
}

/// Two's-complement arithmetic at the operand width. Any unknown digit in
/// either operand, or a zero divisor, makes the result all-`X`. Signed
/// division truncates toward zero and the remainder takes the dividend's
/// sign.
pub(crate) fn eval_arith(op: Op, lhs: &[Value], rhs: &[Value]) -> Vec<Value> {
    if !value::all_known(lhs) || !value::all_known(rhs) {
        return all_x(lhs.len());
    }
    let a = to_bools(lhs);
    let b = to_bools(rhs);
    let result = match op {
        Op::Add => add_bits(&a, &b, false),
        Op::Sub => {
            let flipped: Vec<bool> = b.iter().map(|x| !x).collect();
            add_bits(&a, &flipped, true)
        }
        Op::Mul => mul_bits(&a, &b),
        Op::Udiv | Op::Urem | Op::Sdiv | Op::Srem => {
            if is_zero_bits(&b) {
                return all_x(lhs.len());
            }
            match op {
                Op::Udiv => udivrem_bits(&a, &b).0,
                Op::Urem => udivrem_bits(&a, &b).1,
                Op::Sdiv => {
                    let (q, _) = udivrem_bits(&abs_bits(&a), &abs_bits(&b));
                    if sign_bit(&a) != sign_bit(&b) {
                        negate_bits(&q)
                    } else {
                        q
                    }
                }
                Op::Srem => {
                    let (_, r) = udivrem_bits(&abs_bits(&a), &abs_bits(&b));
                    if sign_bit(&a) { negate_bits(&r) } else { r }
                }
                _ => unreachable!(),
            }
        }
        _ => panic!("eval_arith called with {}", op),
    };
    from_bools(&result)
}

/// Single-digit comparison result; any unknown operand digit gives `X`.
pub(crate) fn eval_comparison(op: Op, lhs: &[Value], rhs: &[Value]) -> Vec<Value> {
    if !value::all_known(lhs) || !value::all_known(rhs) {
        return vec![Value::X];
    }
    let a = to_bools(lhs);
    let b = to_bools(rhs);
    let result = match op {
        Op::Eq => a == b,
        Op::Ult => ult_bits(&a, &b),
        Op::Ule => !ult_bits(&b, &a),
        Op::Slt => slt_bits(&a, &b),
        Op::Sle => !slt_bits(&b, &a),
        _ => panic!("eval_comparison called with {}", op),
    };
    vec![Value::from_bool(result)]
}

/// `lhs` supplies the most significant digits.
pub(crate) fn eval_concat(lhs: &[Value], rhs: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(lhs.len() + rhs.len());
    out.extend_from_slice(rhs);
    out.extend_from_slice(lhs);
    out
}

pub(crate) fn eval_slice(operand: &[Value], start: usize, end: usize) -> Vec<Value> {
    operand[start..=end].to_vec()
}

pub(crate) fn eval_zext(operand: &[Value], target: usize) -> Vec<Value> {
    let mut out = operand.to_vec();
    out.resize(target, Value::Zero);
    out
}

pub(crate) fn eval_sext(operand: &[Value], target: usize) -> Vec<Value> {
    let top = *operand.last().expect("bit vectors are non-empty");
    let mut out = operand.to_vec();
    out.resize(target, top);
    out
}

pub(crate) fn eval_ite(cond: &[Value], on_true: &[Value], on_false: &[Value]) -> Vec<Value> {
    match cond[0] {
        Value::One => on_true.to_vec(),
        Value::Zero => on_false.to_vec(),
        _ => all_x(on_true.len()),
    }
}

// -- Interpreter ------------------------------------------------------------

fn eval_nodes(
    f: &BooleanFunction,
    env: &HashMap<String, Vec<Value>>,
) -> Result<Vec<Value>, EvalError> {
    let top = match f.get_top_level_node() {
        Some(node) => node,
        None => return Err(EvalError::EmptyFunction),
    };
    if top.is_index() {
        return Err(EvalError::StrayIndexNode {
            index: f.len() - 1,
        });
    }
    log::trace!("evaluating {} node(s)", f.len());
    // (producing node index, value) pairs; index nodes push a placeholder
    // that only their consuming operator looks through.
    let mut stack: Vec<(usize, Vec<Value>)> = Vec::new();
    for (i, node) in f.nodes().iter().enumerate() {
        match &node.payload {
            NodePayload::Constant(values) => stack.push((i, values.clone())),
            NodePayload::Index(_) => stack.push((i, Vec::new())),
            NodePayload::Variable(name) => {
                let binding = env.get(name).ok_or_else(|| EvalError::UnboundVariable {
                    name: name.clone(),
                })?;
                if binding.len() != node.size {
                    return Err(EvalError::BindingWidthMismatch {
                        name: name.clone(),
                        expected: node.size,
                        got: binding.len(),
                    });
                }
                stack.push((i, binding.clone()));
            }
            NodePayload::Op(op) => {
                let at = stack.len() - node.get_arity();
                let operands = stack.split_off(at);
                let result = match op {
                    Op::And | Op::Or | Op::Xor => {
                        eval_bitwise(*op, &operands[0].1, &operands[1].1)
                    }
                    Op::Not => eval_not(&operands[0].1),
                    Op::Add
                    | Op::Sub
                    | Op::Mul
                    | Op::Sdiv
                    | Op::Udiv
                    | Op::Srem
                    | Op::Urem => eval_arith(*op, &operands[0].1, &operands[1].1),
                    Op::Eq | Op::Sle | Op::Slt | Op::Ule | Op::Ult => {
                        eval_comparison(*op, &operands[0].1, &operands[1].1)
                    }
                    Op::Concat => eval_concat(&operands[0].1, &operands[1].1),
                    Op::Slice => {
                        let start = f.nodes()[operands[1].0]
                            .get_index_value()
                            .expect("validated slice carries index bounds");
                        let end = f.nodes()[operands[2].0]
                            .get_index_value()
                            .expect("validated slice carries index bounds");
                        eval_slice(&operands[0].1, start, end)
                    }
                    Op::Zext => eval_zext(&operands[0].1, node.size),
                    Op::Sext => eval_sext(&operands[0].1, node.size),
                    Op::Ite => eval_ite(&operands[0].1, &operands[1].1, &operands[2].1),
                };
                stack.push((i, result));
            }
        }
    }
    let (_, result) = stack.pop().expect("validated function leaves one result");
    Ok(result)
}

/// Evaluates a single-digit function under single-digit variable bindings.
///
/// Functions with wider variables or a wider result are rejected; use
/// [`evaluate_bits`] for those.
pub fn evaluate(f: &BooleanFunction, env: &HashMap<String, Value>) -> Result<Value, EvalError> {
    if f.is_empty() {
        return Err(EvalError::EmptyFunction);
    }
    if f.size() != 1 {
        return Err(EvalError::NonBooleanResult { width: f.size() });
    }
    for (name, width) in f.get_variables() {
        if width != 1 {
            return Err(EvalError::NonBooleanVariable { name, width });
        }
    }
    let wide_env: HashMap<String, Vec<Value>> =
        env.iter().map(|(k, v)| (k.clone(), vec![*v])).collect();
    let result = eval_nodes(f, &wide_env)?;
    Ok(result[0])
}

/// Evaluates under full-width bindings; the result is LSB first. Bindings
/// must match each variable's declared width exactly; extra bindings are
/// ignored.
pub fn evaluate_bits(
    f: &BooleanFunction,
    env: &HashMap<String, Vec<Value>>,
) -> Result<Vec<Value>, EvalError> {
    eval_nodes(f, env)
}

/// Enumerates the function over every assignment of its (single-digit)
/// variables.
///
/// Row `r` holds the function's output (LSB first) under the assignment
/// where variable `k` of the order carries bit `k` of `r`. An empty
/// `ordered_variables` means the function's own sorted variable set. With
/// `remove_unknown` set, order entries that are not function variables are
/// dropped; otherwise they are enumerated as axes and duplicate the output
/// across them. The order must cover every function variable either way.
pub fn compute_truth_table(
    f: &BooleanFunction,
    ordered_variables: &[String],
    remove_unknown: bool,
) -> Result<Vec<Vec<Value>>, EvalError> {
    if f.is_empty() {
        return Err(EvalError::EmptyFunction);
    }
    let variables = f.get_variables();
    for (name, width) in &variables {
        if *width != 1 {
            return Err(EvalError::NonBooleanVariable {
                name: name.clone(),
                width: *width,
            });
        }
    }
    let names: Vec<&String> = variables.iter().map(|(name, _)| name).collect();
    let order: Vec<String> = if ordered_variables.is_empty() {
        names.iter().map(|name| (*name).clone()).collect()
    } else if remove_unknown {
        ordered_variables
            .iter()
            .filter(|name| names.contains(name))
            .cloned()
            .collect()
    } else {
        ordered_variables.to_vec()
    };
    for name in &names {
        if !order.contains(*name) {
            return Err(EvalError::MissingVariable {
                name: (*name).clone(),
            });
        }
    }
    if order.len() > MAX_TRUTH_TABLE_VARIABLES {
        return Err(EvalError::TooManyVariables {
            count: order.len(),
            limit: MAX_TRUTH_TABLE_VARIABLES,
        });
    }
    let rows = 1usize << order.len();
    log::debug!(
        "truth table: {} variable(s), {} row(s)",
        order.len(),
        rows
    );
    let mut table = Vec::with_capacity(rows);
    for row in 0..rows {
        let env: HashMap<String, Vec<Value>> = order
            .iter()
            .enumerate()
            .map(|(k, name)| {
                (
                    name.clone(),
                    vec![Value::from_bool((row >> k) & 1 == 1)],
                )
            })
            .collect();
        table.push(eval_nodes(f, &env)?);
    }
    Ok(table)
}
