// SPDX-License-Identifier: Apache-2.0

//! Parser for the infix expression text format.
//!
//! The grammar is the one [`crate::bf::default_node_printer`] emits, so
//! printing and reparsing a function reproduces it node for node:
//!
//! - literals `0` / `1` and `bits[N]:V` with `V` decimal, `0x` hex or `0b`
//!   binary; binary digits may include `x` / `z`;
//! - variables `ident` (width 1) or `ident: bits[N]`; `bits` is reserved;
//! - infix `|`, `^`, `&`, `+`, `-`, `*` and unary `!`, loosest first, with
//!   parentheses for grouping;
//! - call syntax for everything else, e.g. `ule(a, b)`, `slice(a, 1, 2)`,
//!   `zext(a, 4)`, `ite(c, t, f)`, plus spelled-out aliases like `and(a, b)`.

use crate::bf::{self, BooleanFunction, Node, NodePayload, Op};
use crate::value::{self, Value};

/// Parses `text` into a validated [`BooleanFunction`]. Whitespace-only
/// input yields the empty function.
pub fn from_string(text: &str) -> Result<BooleanFunction, ParseError> {
    let mut parser = Parser::new(text);
    parser.parse_function()
}

#[derive(Debug)]
pub struct ParseError {
    msg: String,
}

impl ParseError {
    fn new(msg: String) -> Self {
        Self { msg }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}", self.msg)
    }
}

impl std::error::Error for ParseError {}

fn top_size(nodes: &[Node]) -> usize {
    nodes.last().expect("expression fragments are non-empty").size
}

fn append_unary(mut operand: Vec<Node>, op: Op) -> Vec<Node> {
    let size = top_size(&operand);
    operand.push(Node {
        size,
        payload: NodePayload::Op(op),
    });
    operand
}

fn append_binary(mut lhs: Vec<Node>, rhs: Vec<Node>, op: Op) -> Vec<Node> {
    let size = match op {
        Op::Eq | Op::Sle | Op::Slt | Op::Ule | Op::Ult => 1,
        Op::Concat => top_size(&lhs) + top_size(&rhs),
        _ => top_size(&lhs),
    };
    lhs.extend(rhs);
    lhs.push(Node {
        size,
        payload: NodePayload::Op(op),
    });
    lhs
}

fn constant_node(values: Vec<Value>) -> Node {
    Node {
        size: values.len(),
        payload: NodePayload::Constant(values),
    }
}

pub struct Parser {
    chars: Vec<char>,
    offset: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            offset: 0,
        }
    }

    pub fn parse_function(&mut self) -> Result<BooleanFunction, ParseError> {
        self.drop_whitespace();
        if self.offset >= self.chars.len() {
            return Ok(BooleanFunction::default());
        }
        let nodes = self.parse_expression()?;
        self.drop_whitespace();
        if self.offset < self.chars.len() {
            return Err(ParseError::new(format!(
                "unexpected trailing text: {:?}",
                self.rest_of_line()
            )));
        }
        BooleanFunction::build(nodes)
            .map_err(|e| ParseError::new(format!("parsed expression failed validation: {}", e)))
    }

    // -- Scanner --------------------------------------------------------

    fn rest(&self) -> String {
        self.chars[self.offset..].iter().collect::<String>()
    }

    fn rest_of_line(&self) -> String {
        let rest = self.rest();
        if let Some(pos) = rest.find('\n') {
            rest[..pos].to_string()
        } else {
            rest
        }
    }

    fn drop_whitespace(&mut self) {
        // Consume only ASCII whitespace characters: space, tab, CR, LF.
        while let Some(c) = self.peekc() {
            if c == ' ' || c == '\t' || c == '\r' || c == '\n' {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    fn peekc(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    fn popc(&mut self) -> Option<char> {
        let c = self.peekc();
        self.offset += 1;
        c
    }

    fn peek_is(&self, s: &str) -> bool {
        for (i, c) in s.chars().enumerate() {
            let char_index = self.offset + i;
            if char_index >= self.chars.len() {
                return false;
            }
            if self.chars[char_index] != c {
                return false;
            }
        }
        true
    }

    fn is_ident_start(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == '_'
    }

    fn is_ident_rest(c: char) -> bool {
        Self::is_ident_start(c) || c.is_ascii_digit()
    }

    fn peek_keyword_is(&self, kw: &str) -> bool {
        if !self.peek_is(kw) {
            return false;
        }
        let next_index = self.offset + kw.len();
        if next_index >= self.chars.len() {
            return true;
        }
        !Self::is_ident_rest(self.chars[next_index])
    }

    fn try_drop_keyword(&mut self, kw: &str) -> bool {
        self.drop_whitespace();
        if self.peek_keyword_is(kw) {
            self.offset += kw.len();
            true
        } else {
            false
        }
    }

    fn drop_keyword_or_error(&mut self, kw: &str, ctx: &str) -> Result<(), ParseError> {
        if self.try_drop_keyword(kw) {
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "expected keyword {:?} in {}; rest_of_line: {:?}",
                kw,
                ctx,
                self.rest_of_line()
            )))
        }
    }

    fn try_drop(&mut self, s: &str) -> bool {
        self.drop_whitespace();
        if self.peek_is(s) {
            self.offset += s.len();
            true
        } else {
            false
        }
    }

    fn drop_or_error(&mut self, s: &str, ctx: &str) -> Result<(), ParseError> {
        if self.try_drop(s) {
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "expected {:?} in {}; rest_of_line: {:?}",
                s,
                ctx,
                self.rest_of_line()
            )))
        }
    }

    fn pop_identifier_or_error(&mut self, ctx: &str) -> Result<String, ParseError> {
        self.drop_whitespace();
        let mut identifier = String::new();
        while let Some(c) = self.peekc() {
            if identifier.is_empty() {
                if !Self::is_ident_start(c) {
                    return Err(ParseError::new(format!(
                        "in {} expected identifier, got {:?}; rest_of_line: {:?}",
                        ctx,
                        c,
                        self.rest_of_line()
                    )));
                }
            } else if !Self::is_ident_rest(c) {
                return Ok(identifier);
            }
            self.offset += 1;
            identifier.push(c);
        }
        if identifier.is_empty() {
            return Err(ParseError::new(format!(
                "in {} expected identifier, got EOF",
                ctx
            )));
        }
        Ok(identifier)
    }

    fn pop_number_string_or_error(&mut self, ctx: &str) -> Result<String, ParseError> {
        self.drop_whitespace();
        let mut number = String::new();

        // Handle radix prefixes. Binary accepts the four-state digits.
        if self.peek_is("0x") || self.peek_is("0X") {
            number.push(self.popc().unwrap());
            number.push(self.popc().unwrap());
            while let Some(c) = self.peekc() {
                if c.is_ascii_hexdigit() {
                    number.push(c);
                    self.popc();
                } else if c == '_' {
                    self.popc();
                } else {
                    break;
                }
            }
        } else if self.peek_is("0b") || self.peek_is("0B") {
            number.push(self.popc().unwrap());
            number.push(self.popc().unwrap());
            while let Some(c) = self.peekc() {
                if matches!(c, '0' | '1' | 'x' | 'z' | 'X' | 'Z') {
                    number.push(c);
                    self.popc();
                } else if c == '_' {
                    self.popc();
                } else {
                    break;
                }
            }
        } else {
            while let Some(c) = self.peekc() {
                if c.is_ascii_digit() {
                    number.push(c);
                    self.popc();
                } else if c == '_' {
                    self.popc();
                } else {
                    break;
                }
            }
        }

        if number.is_empty() {
            Err(ParseError::new(format!(
                "expected number in {}; rest_of_line: {:?}",
                ctx,
                self.rest_of_line()
            )))
        } else {
            Ok(number)
        }
    }

    fn pop_number_usize_or_error(&mut self, ctx: &str) -> Result<usize, ParseError> {
        let number = self.pop_number_string_or_error(ctx)?;
        match number.parse::<usize>() {
            Ok(v) => Ok(v),
            Err(e) => Err(ParseError::new(format!(
                "in {} expected unsigned integer, got {:?}: {}",
                ctx, number, e
            ))),
        }
    }

    // -- Grammar --------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut lhs = self.parse_xor_expression()?;
        while self.try_drop("|") {
            let rhs = self.parse_xor_expression()?;
            lhs = append_binary(lhs, rhs, Op::Or);
        }
        Ok(lhs)
    }

    fn parse_xor_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut lhs = self.parse_and_expression()?;
        while self.try_drop("^") {
            let rhs = self.parse_and_expression()?;
            lhs = append_binary(lhs, rhs, Op::Xor);
        }
        Ok(lhs)
    }

    fn parse_and_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut lhs = self.parse_additive_expression()?;
        while self.try_drop("&") {
            let rhs = self.parse_additive_expression()?;
            lhs = append_binary(lhs, rhs, Op::And);
        }
        Ok(lhs)
    }

    fn parse_additive_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut lhs = self.parse_multiplicative_expression()?;
        loop {
            if self.try_drop("+") {
                let rhs = self.parse_multiplicative_expression()?;
                lhs = append_binary(lhs, rhs, Op::Add);
            } else if self.try_drop("-") {
                let rhs = self.parse_multiplicative_expression()?;
                lhs = append_binary(lhs, rhs, Op::Sub);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut lhs = self.parse_unary_expression()?;
        while self.try_drop("*") {
            let rhs = self.parse_unary_expression()?;
            lhs = append_binary(lhs, rhs, Op::Mul);
        }
        Ok(lhs)
    }

    fn parse_unary_expression(&mut self) -> Result<Vec<Node>, ParseError> {
        if self.try_drop("!") {
            let operand = self.parse_unary_expression()?;
            return Ok(append_unary(operand, Op::Not));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Vec<Node>, ParseError> {
        self.drop_whitespace();
        if self.try_drop("(") {
            let inner = self.parse_expression()?;
            self.drop_or_error(")", "parenthesized expression")?;
            return Ok(inner);
        }
        if self.peek_keyword_is("bits") {
            return self.parse_bits_literal();
        }
        match self.peekc() {
            Some(c) if c.is_ascii_digit() => self.parse_bit_shorthand(),
            Some(c) if Self::is_ident_start(c) => self.parse_variable_or_call(),
            Some(c) => Err(ParseError::new(format!(
                "expected expression, got {:?}; rest_of_line: {:?}",
                c,
                self.rest_of_line()
            ))),
            None => Err(ParseError::new("expected expression, got EOF".to_string())),
        }
    }

    fn parse_bit_shorthand(&mut self) -> Result<Vec<Node>, ParseError> {
        let number = self.pop_number_string_or_error("bit literal")?;
        match number.as_str() {
            "0" => Ok(vec![constant_node(vec![Value::Zero])]),
            "1" => Ok(vec![constant_node(vec![Value::One])]),
            other => Err(ParseError::new(format!(
                "number literal {:?} needs a width annotation; write bits[N]:{}",
                other, other
            ))),
        }
    }

    fn parse_bits_literal(&mut self) -> Result<Vec<Node>, ParseError> {
        self.drop_keyword_or_error("bits", "bits literal")?;
        self.drop_or_error("[", "bits literal")?;
        let width = self.pop_number_usize_or_error("bits literal width")?;
        self.drop_or_error("]", "bits literal")?;
        self.drop_or_error(":", "bits literal")?;
        let number = self.pop_number_string_or_error("bits literal value")?;
        let values = bits_literal_values(&number, width)?;
        Ok(vec![constant_node(values)])
    }

    fn parse_variable_or_call(&mut self) -> Result<Vec<Node>, ParseError> {
        let name = self.pop_identifier_or_error("expression")?;
        if self.try_drop("(") {
            return self.parse_call(&name);
        }
        let size = if self.try_drop(":") {
            self.drop_keyword_or_error("bits", "variable width annotation")?;
            self.drop_or_error("[", "variable width annotation")?;
            let width = self.pop_number_usize_or_error("variable width")?;
            self.drop_or_error("]", "variable width annotation")?;
            width
        } else {
            1
        };
        Ok(vec![Node {
            size,
            payload: NodePayload::Variable(name),
        }])
    }

    /// Parses the arguments of `name(...)`; the opening parenthesis has
    /// already been consumed.
    fn parse_call(&mut self, name: &str) -> Result<Vec<Node>, ParseError> {
        let op = bf::operator_to_op(name).ok_or_else(|| {
            ParseError::new(format!(
                "unknown function {:?}; rest_of_line: {:?}",
                name,
                self.rest_of_line()
            ))
        })?;
        let nodes = match op {
            Op::Not => {
                let operand = self.parse_expression()?;
                append_unary(operand, Op::Not)
            }
            Op::Slice => {
                let operand = self.parse_expression()?;
                self.drop_or_error(",", "slice arguments")?;
                let start = self.pop_number_usize_or_error("slice start")?;
                self.drop_or_error(",", "slice arguments")?;
                let end = self.pop_number_usize_or_error("slice end")?;
                let result_width = end
                    .checked_sub(start)
                    .map(|delta| delta + 1)
                    .ok_or_else(|| {
                        ParseError::new(format!("slice start {} exceeds end {}", start, end))
                    })?;
                let operand_size = top_size(&operand);
                let mut nodes = operand;
                nodes.push(Node {
                    size: operand_size,
                    payload: NodePayload::Index(start),
                });
                nodes.push(Node {
                    size: operand_size,
                    payload: NodePayload::Index(end),
                });
                nodes.push(Node {
                    size: result_width,
                    payload: NodePayload::Op(Op::Slice),
                });
                nodes
            }
            Op::Zext | Op::Sext => {
                let operand = self.parse_expression()?;
                self.drop_or_error(",", "extension arguments")?;
                let target = self.pop_number_usize_or_error("extension width")?;
                let mut nodes = operand;
                nodes.push(Node {
                    size: target,
                    payload: NodePayload::Index(target),
                });
                nodes.push(Node {
                    size: target,
                    payload: NodePayload::Op(op),
                });
                nodes
            }
            Op::Ite => {
                let cond = self.parse_expression()?;
                self.drop_or_error(",", "ite arguments")?;
                let on_true = self.parse_expression()?;
                self.drop_or_error(",", "ite arguments")?;
                let on_false = self.parse_expression()?;
                let size = top_size(&on_true);
                let mut nodes = cond;
                nodes.extend(on_true);
                nodes.extend(on_false);
                nodes.push(Node {
                    size,
                    payload: NodePayload::Op(Op::Ite),
                });
                nodes
            }
            _ => {
                let lhs = self.parse_expression()?;
                self.drop_or_error(",", "call arguments")?;
                let rhs = self.parse_expression()?;
                append_binary(lhs, rhs, op)
            }
        };
        self.drop_or_error(")", "call arguments")?;
        Ok(nodes)
    }
}

fn bits_literal_values(number: &str, width: usize) -> Result<Vec<Value>, ParseError> {
    if let Some(digits) = number
        .strip_prefix("0b")
        .or_else(|| number.strip_prefix("0B"))
    {
        let mut values = value::values_from_bin_string(digits)
            .map_err(|e| ParseError::new(format!("in bits[{}] literal: {}", width, e)))?;
        if values.len() > width {
            return Err(ParseError::new(format!(
                "binary literal 0b{} has {} digit(s); does not fit in bits[{}]",
                digits,
                values.len(),
                width
            )));
        }
        // Text may give fewer digits than the width; missing high digits
        // are zero.
        values.resize(width, Value::Zero);
        Ok(values)
    } else {
        let parsed = if let Some(digits) = number
            .strip_prefix("0x")
            .or_else(|| number.strip_prefix("0X"))
        {
            u64::from_str_radix(digits, 16)
        } else {
            number.parse::<u64>()
        };
        let parsed = parsed.map_err(|e| {
            ParseError::new(format!("bits literal value {:?} does not parse: {}", number, e))
        })?;
        value::values_from_u64(parsed, width)
            .map_err(|e| ParseError::new(format!("in bits[{}] literal: {}", width, e)))
    }
}
