// SPDX-License-Identifier: Apache-2.0

//! Core expression representation.
//!
//! A `BooleanFunction` owns a flat vector of nodes in postfix order: every
//! operand precedes the operator that consumes it, and the last node is the
//! top of the expression. Shared subexpressions are not deduplicated; the
//! encoding is a tree spelled out in evaluation order.
//!
//! Functions are immutable once built. Every constructor goes through
//! [`BooleanFunction::build`], which validates stack discipline and the
//! per-operator width rules, so downstream passes can rely on a well-formed
//! node list.

use std::collections::BTreeMap;
use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Sub};

use crate::bf_validate::{self, ValidationError};
use crate::value::{self, Value};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Op {
    And,
    Or,
    Xor,
    Not,

    Add,
    Sub,
    Mul,
    Sdiv,
    Udiv,
    Srem,
    Urem,

    Concat,
    Slice,
    Zext,
    Sext,

    Eq,
    // signed comparisons
    Sle,
    Slt,
    // unsigned comparisons
    Ule,
    Ult,

    Ite,
}

pub fn operator_to_op(operator: &str) -> Option<Op> {
    match operator {
        "and" => Some(Op::And),
        "or" => Some(Op::Or),
        "xor" => Some(Op::Xor),
        "not" => Some(Op::Not),
        // arithmetic
        "add" => Some(Op::Add),
        "sub" => Some(Op::Sub),
        "mul" => Some(Op::Mul),
        "sdiv" => Some(Op::Sdiv),
        "udiv" => Some(Op::Udiv),
        "srem" => Some(Op::Srem),
        "urem" => Some(Op::Urem),
        // width manipulation
        "concat" => Some(Op::Concat),
        "slice" => Some(Op::Slice),
        "zext" => Some(Op::Zext),
        "sext" => Some(Op::Sext),
        // comparisons
        "eq" => Some(Op::Eq),
        "sle" => Some(Op::Sle),
        "slt" => Some(Op::Slt),
        "ule" => Some(Op::Ule),
        "ult" => Some(Op::Ult),

        "ite" => Some(Op::Ite),
        _ => None,
    }
}

pub fn op_to_operator(op: Op) -> &'static str {
    match op {
        Op::And => "and",
        Op::Or => "or",
        Op::Xor => "xor",
        Op::Not => "not",
        Op::Add => "add",
        Op::Sub => "sub",
        Op::Mul => "mul",
        Op::Sdiv => "sdiv",
        Op::Udiv => "udiv",
        Op::Srem => "srem",
        Op::Urem => "urem",
        Op::Concat => "concat",
        Op::Slice => "slice",
        Op::Zext => "zext",
        Op::Sext => "sext",
        Op::Eq => "eq",
        Op::Sle => "sle",
        Op::Slt => "slt",
        Op::Ule => "ule",
        Op::Ult => "ult",
        Op::Ite => "ite",
    }
}

/// Returns the infix spelling for operators that have one; the others are
/// rendered in call syntax.
pub fn op_to_infix_operator(op: Op) -> Option<&'static str> {
    match op {
        Op::And => Some("&"),
        Op::Or => Some("|"),
        Op::Xor => Some("^"),
        Op::Add => Some("+"),
        Op::Sub => Some("-"),
        Op::Mul => Some("*"),
        _ => None,
    }
}

impl Op {
    /// Number of operands the operator consumes from the stack. Slice counts
    /// its two index parameters and the extensions count their width
    /// parameter.
    pub fn get_arity(self) -> usize {
        match self {
            Op::Not => 1,
            Op::Zext | Op::Sext => 2,
            Op::Slice | Op::Ite => 3,
            _ => 2,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, Op::And | Op::Or | Op::Xor | Op::Add | Op::Mul | Op::Eq)
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", op_to_operator(*self))
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum NodePayload {
    /// A literal digit vector, LSB first. The vector length equals the
    /// node's declared width.
    Constant(Vec<Value>),
    /// A structural integer parameter; only meaningful as an operand of
    /// slice/zext/sext (or as a lone single-node function).
    Index(usize),
    /// A named free variable.
    Variable(String),
    Op(Op),
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Node {
    /// Width of the value this node produces, in digits.
    pub size: usize,
    pub payload: NodePayload,
}

impl Node {
    pub fn get_operator(&self) -> &str {
        match &self.payload {
            NodePayload::Constant(_) => "constant",
            NodePayload::Index(_) => "index",
            NodePayload::Variable(_) => "variable",
            NodePayload::Op(op) => op_to_operator(*op),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.payload, NodePayload::Constant(_))
    }

    pub fn is_index(&self) -> bool {
        matches!(self.payload, NodePayload::Index(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.payload, NodePayload::Variable(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self.payload, NodePayload::Op(_))
    }

    /// True for nodes that push a value without consuming any, i.e.
    /// constants, indices and variables.
    pub fn is_operand(&self) -> bool {
        !self.is_operation()
    }

    pub fn get_arity(&self) -> usize {
        match &self.payload {
            NodePayload::Op(op) => op.get_arity(),
            _ => 0,
        }
    }

    pub fn is_commutative(&self) -> bool {
        match &self.payload {
            NodePayload::Op(op) => op.is_commutative(),
            _ => false,
        }
    }

    pub fn get_constant_value(&self) -> Result<&[Value], String> {
        match &self.payload {
            NodePayload::Constant(values) => Ok(values),
            _ => Err(format!(
                "expected constant node; got {}",
                self.get_operator()
            )),
        }
    }

    pub fn get_index_value(&self) -> Result<usize, String> {
        match &self.payload {
            NodePayload::Index(value) => Ok(*value),
            _ => Err(format!("expected index node; got {}", self.get_operator())),
        }
    }

    pub fn get_variable_name(&self) -> Result<&str, String> {
        match &self.payload {
            NodePayload::Variable(name) => Ok(name),
            _ => Err(format!(
                "expected variable node; got {}",
                self.get_operator()
            )),
        }
    }

    pub fn get_op(&self) -> Result<Op, String> {
        match &self.payload {
            NodePayload::Op(op) => Ok(*op),
            _ => Err(format!(
                "expected operator node; got {}",
                self.get_operator()
            )),
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Nodes sort operands before operators, then by width, then by payload
/// content; a cheap total order for canonicalization and stable test output.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn kind_rank(payload: &NodePayload) -> u8 {
            match payload {
                NodePayload::Constant(_) => 0,
                NodePayload::Index(_) => 1,
                NodePayload::Variable(_) => 2,
                NodePayload::Op(_) => 3,
            }
        }
        kind_rank(&self.payload)
            .cmp(&kind_rank(&other.payload))
            .then_with(|| self.size.cmp(&other.size))
            .then_with(|| self.payload.cmp(&other.payload))
    }
}

/// Renders a constant digit vector in the literal grammar: `0`/`1` for
/// single Boolean digits, `bits[N]:D` decimal when every digit is Boolean
/// and the value fits in a u64, `bits[N]:0b...` otherwise.
fn constant_to_string(values: &[Value]) -> String {
    if values.len() == 1 {
        match values[0] {
            Value::Zero => return "0".to_string(),
            Value::One => return "1".to_string(),
            _ => {}
        }
    }
    if values.len() <= 64 && value::all_known(values) {
        let v = values_to_u64_for_display(values);
        format!("bits[{}]:{}", values.len(), v)
    } else {
        format!(
            "bits[{}]:0b{}",
            values.len(),
            value::values_to_bin_string(values)
        )
    }
}

fn values_to_u64_for_display(values: &[Value]) -> u64 {
    value::values_to_u64(values).expect("all-known value vector of <= 64 digits converts")
}

/// A symbolic Boolean/bit-vector expression in postfix node order.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct BooleanFunction {
    nodes: Vec<Node>,
}

impl BooleanFunction {
    /// Validates `nodes` and wraps them. This is the only door into the
    /// type; everything else layers on top of it.
    pub fn build(nodes: Vec<Node>) -> Result<Self, ValidationError> {
        bf_validate::validate_nodes(&nodes)?;
        Ok(Self { nodes })
    }

    /// Wraps nodes that are already known to satisfy the structural
    /// invariants, e.g. a subrange of a validated function.
    pub(crate) fn from_validated_nodes(nodes: Vec<Node>) -> Self {
        debug_assert!(bf_validate::validate_nodes(&nodes).is_ok());
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the postfix sequence.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Width of the value the function produces; 0 for the empty function.
    pub fn size(&self) -> usize {
        self.nodes.last().map(|n| n.size).unwrap_or(0)
    }

    pub fn get_top_level_node(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// For each node index, the node count of the subexpression that ends
    /// there (1 for operands, operand spans plus one for operators).
    pub fn compute_node_coverage(&self) -> Vec<usize> {
        let mut coverage = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = Vec::new();
        for node in &self.nodes {
            let mut span = 1;
            for _ in 0..node.get_arity() {
                span += stack.pop().expect("validated nodes have balanced stack");
            }
            coverage.push(span);
            stack.push(span);
        }
        coverage
    }

    /// Returns the immediate operand subexpressions of the top operator in
    /// left-to-right order; empty for operand-only and empty functions.
    pub fn get_parameters(&self) -> Vec<BooleanFunction> {
        let arity = match self.get_top_level_node() {
            Some(node) if node.is_operation() => node.get_arity(),
            _ => return Vec::new(),
        };
        let coverage = self.compute_node_coverage();
        let mut parameters = Vec::with_capacity(arity);
        let mut end = self.nodes.len() - 1;
        for _ in 0..arity {
            let operand_end = end - 1;
            let span = coverage[operand_end];
            let start = operand_end + 1 - span;
            parameters.push(Self::from_validated_nodes(
                self.nodes[start..=operand_end].to_vec(),
            ));
            end = start;
        }
        parameters.reverse();
        parameters
    }

    /// Sorted, deduplicated names of the free variables.
    pub fn get_variable_names(&self) -> Vec<String> {
        self.get_variables().into_iter().map(|(name, _)| name).collect()
    }

    /// Sorted (name, width) pairs for the free variables. Widths are
    /// consistent per name; validation rejects conflicting uses.
    pub fn get_variables(&self) -> Vec<(String, usize)> {
        let mut variables: BTreeMap<String, usize> = BTreeMap::new();
        for node in &self.nodes {
            if let NodePayload::Variable(name) = &node.payload {
                variables.insert(name.clone(), node.size);
            }
        }
        variables.into_iter().collect()
    }

    // -- Factories ----------------------------------------------------------

    pub fn var(name: &str, size: usize) -> Result<Self, ValidationError> {
        Self::build(vec![Node {
            size,
            payload: NodePayload::Variable(name.to_string()),
        }])
    }

    /// Single-digit constant; infallible since every `Value` is a valid
    /// one-digit vector.
    pub fn constant_bit(value: Value) -> Self {
        Self {
            nodes: vec![Node {
                size: 1,
                payload: NodePayload::Constant(vec![value]),
            }],
        }
    }

    pub fn constant(values: Vec<Value>) -> Result<Self, ValidationError> {
        let size = values.len();
        Self::build(vec![Node {
            size,
            payload: NodePayload::Constant(values),
        }])
    }

    pub fn constant_u64(value: u64, size: usize) -> Result<Self, ValidationError> {
        let values = value::values_from_u64(value, size)
            .map_err(|_| ValidationError::ConstantOutOfRange { value, width: size })?;
        Self::constant(values)
    }

    /// A lone structural index node; mostly useful as a building block for
    /// slice/zext/sext sequences assembled by hand.
    pub fn index(value: usize, size: usize) -> Result<Self, ValidationError> {
        Self::build(vec![Node {
            size,
            payload: NodePayload::Index(value),
        }])
    }

    fn unary(op: Op, operand: &Self, size: usize) -> Result<Self, ValidationError> {
        let mut nodes = Vec::with_capacity(operand.nodes.len() + 1);
        nodes.extend_from_slice(&operand.nodes);
        nodes.push(Node {
            size,
            payload: NodePayload::Op(op),
        });
        Self::build(nodes)
    }

    fn binary(op: Op, lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        let mut nodes = Vec::with_capacity(lhs.nodes.len() + rhs.nodes.len() + 1);
        nodes.extend_from_slice(&lhs.nodes);
        nodes.extend_from_slice(&rhs.nodes);
        nodes.push(Node {
            size,
            payload: NodePayload::Op(op),
        });
        Self::build(nodes)
    }

    pub fn and(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::And, lhs, rhs, size)
    }

    pub fn or(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Or, lhs, rhs, size)
    }

    pub fn xor(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Xor, lhs, rhs, size)
    }

    pub fn not(operand: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::unary(Op::Not, operand, size)
    }

    pub fn add(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Add, lhs, rhs, size)
    }

    pub fn sub(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Sub, lhs, rhs, size)
    }

    pub fn mul(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Mul, lhs, rhs, size)
    }

    pub fn sdiv(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Sdiv, lhs, rhs, size)
    }

    pub fn udiv(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Udiv, lhs, rhs, size)
    }

    pub fn srem(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Srem, lhs, rhs, size)
    }

    pub fn urem(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Urem, lhs, rhs, size)
    }

    /// `lhs` supplies the most significant digits of the result.
    pub fn concat(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Concat, lhs, rhs, size)
    }

    pub fn eq(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Eq, lhs, rhs, size)
    }

    pub fn sle(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Sle, lhs, rhs, size)
    }

    pub fn slt(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Slt, lhs, rhs, size)
    }

    pub fn ule(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Ule, lhs, rhs, size)
    }

    pub fn ult(lhs: &Self, rhs: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::binary(Op::Ult, lhs, rhs, size)
    }

    /// Extracts digits `start..=end` (LSB-indexed) of `operand`. The bounds
    /// are encoded as index nodes carrying the operand's width.
    pub fn slice(
        operand: &Self,
        start: usize,
        end: usize,
        size: usize,
    ) -> Result<Self, ValidationError> {
        let operand_size = operand.size();
        let mut nodes = Vec::with_capacity(operand.nodes.len() + 3);
        nodes.extend_from_slice(&operand.nodes);
        nodes.push(Node {
            size: operand_size,
            payload: NodePayload::Index(start),
        });
        nodes.push(Node {
            size: operand_size,
            payload: NodePayload::Index(end),
        });
        nodes.push(Node {
            size,
            payload: NodePayload::Op(Op::Slice),
        });
        Self::build(nodes)
    }

    fn extend(op: Op, operand: &Self, size: usize) -> Result<Self, ValidationError> {
        let mut nodes = Vec::with_capacity(operand.nodes.len() + 2);
        nodes.extend_from_slice(&operand.nodes);
        nodes.push(Node {
            size,
            payload: NodePayload::Index(size),
        });
        nodes.push(Node {
            size,
            payload: NodePayload::Op(op),
        });
        Self::build(nodes)
    }

    /// Widens `operand` to `size` digits by padding with zeros.
    pub fn zext(operand: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::extend(Op::Zext, operand, size)
    }

    /// Widens `operand` to `size` digits by replicating the most
    /// significant digit.
    pub fn sext(operand: &Self, size: usize) -> Result<Self, ValidationError> {
        Self::extend(Op::Sext, operand, size)
    }

    pub fn ite(
        cond: &Self,
        on_true: &Self,
        on_false: &Self,
        size: usize,
    ) -> Result<Self, ValidationError> {
        let mut nodes = Vec::with_capacity(
            cond.nodes.len() + on_true.nodes.len() + on_false.nodes.len() + 1,
        );
        nodes.extend_from_slice(&cond.nodes);
        nodes.extend_from_slice(&on_true.nodes);
        nodes.extend_from_slice(&on_false.nodes);
        nodes.push(Node {
            size,
            payload: NodePayload::Op(Op::Ite),
        });
        Self::build(nodes)
    }

    // -- Printing -----------------------------------------------------------

    /// Renders the function through a per-node callback.
    ///
    /// The callback receives the node, its operands' rendered strings and
    /// the operands' top nodes (in left-to-right order), and returns the
    /// rendering for the subexpression. The default text format and the
    /// SMT-LIB2 bridge both go through this seam; the empty function
    /// renders as the empty string.
    pub fn to_string_with<F>(&self, printer: F) -> Result<String, String>
    where
        F: Fn(&Node, &[String], &[&Node]) -> Result<String, String>,
    {
        let mut stack: Vec<(String, &Node)> = Vec::new();
        for node in &self.nodes {
            let arity = node.get_arity();
            let at = stack.len() - arity;
            let operands = stack.split_off(at);
            let texts: Vec<String> = operands.iter().map(|(text, _)| text.clone()).collect();
            let tops: Vec<&Node> = operands.iter().map(|(_, top)| *top).collect();
            let text = printer(node, &texts, &tops)?;
            stack.push((text, node));
        }
        match stack.pop() {
            Some((text, _)) => Ok(text),
            None => Ok(String::new()),
        }
    }
}

/// Default per-node renderer for [`BooleanFunction::to_string_with`]:
/// parenthesized infix for the operators that have an infix spelling, call
/// syntax for the rest, `bits[N]` annotations on literals and non-Boolean
/// variables.
pub fn default_node_printer(
    node: &Node,
    operands: &[String],
    _operand_nodes: &[&Node],
) -> Result<String, String> {
    match &node.payload {
        NodePayload::Constant(values) => Ok(constant_to_string(values)),
        NodePayload::Index(value) => Ok(value.to_string()),
        NodePayload::Variable(name) => {
            if node.size == 1 {
                Ok(name.clone())
            } else {
                Ok(format!("{}: bits[{}]", name, node.size))
            }
        }
        NodePayload::Op(op) => match op {
            Op::Not => Ok(format!("!{}", operands[0])),
            _ => {
                if let Some(symbol) = op_to_infix_operator(*op) {
                    Ok(format!("({} {} {})", operands[0], symbol, operands[1]))
                } else {
                    Ok(format!("{}({})", op_to_operator(*op), operands.join(", ")))
                }
            }
        },
    }
}

impl std::fmt::Display for BooleanFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .to_string_with(default_node_printer)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{}", text)
    }
}

// Operator sugar over the checked factories. The result takes the left
// operand's width; width mismatches and empty operands panic, so these are
// for expressions whose shapes are known good. Use the factories to handle
// malformed input gracefully.
macro_rules! impl_binary_operator {
    ($trait_name:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $factory:ident) => {
        impl std::ops::$trait_name for &BooleanFunction {
            type Output = BooleanFunction;
            fn $method(self, rhs: &BooleanFunction) -> BooleanFunction {
                BooleanFunction::$factory(self, rhs, self.size())
                    .expect("operator operands must be non-empty and of equal width")
            }
        }

        impl std::ops::$trait_name for BooleanFunction {
            type Output = BooleanFunction;
            fn $method(self, rhs: BooleanFunction) -> BooleanFunction {
                (&self).$method(&rhs)
            }
        }

        impl std::ops::$assign_trait<&BooleanFunction> for BooleanFunction {
            fn $assign_method(&mut self, rhs: &BooleanFunction) {
                *self = (&*self).$method(rhs);
            }
        }

        impl std::ops::$assign_trait<BooleanFunction> for BooleanFunction {
            fn $assign_method(&mut self, rhs: BooleanFunction) {
                self.$assign_method(&rhs);
            }
        }
    };
}

impl_binary_operator!(BitAnd, bitand, BitAndAssign, bitand_assign, and);
impl_binary_operator!(BitOr, bitor, BitOrAssign, bitor_assign, or);
impl_binary_operator!(BitXor, bitxor, BitXorAssign, bitxor_assign, xor);
impl_binary_operator!(Add, add, AddAssign, add_assign, add);
impl_binary_operator!(Sub, sub, SubAssign, sub_assign, sub);
impl_binary_operator!(Mul, mul, MulAssign, mul_assign, mul);

impl std::ops::Not for &BooleanFunction {
    type Output = BooleanFunction;
    fn not(self) -> BooleanFunction {
        BooleanFunction::not(self, self.size())
            .expect("operator operand must be a non-empty function")
    }
}

impl std::ops::Not for BooleanFunction {
    type Output = BooleanFunction;
    fn not(self) -> BooleanFunction {
        !&self
    }
}
