// SPDX-License-Identifier: Apache-2.0

//! Four-state scalar values and helpers for working with vectors of them.
//!
//! A bit-vector is represented as `Vec<Value>` with the least-significant
//! digit at index 0. Text renderings are most-significant-first, matching the
//! usual way numbers are written.

/// A single four-state digit: the two Boolean values plus `X` (unknown) and
/// `Z` (high impedance).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[repr(i8)]
pub enum Value {
    Zero = 0,
    One = 1,
    X = -1,
    Z = -2,
}

impl Value {
    /// Returns true for the two Boolean values, false for `X` and `Z`.
    pub fn is_known(self) -> bool {
        matches!(self, Value::Zero | Value::One)
    }

    pub fn from_bool(b: bool) -> Value {
        if b { Value::One } else { Value::Zero }
    }

    pub fn to_bool(self) -> Result<bool, String> {
        match self {
            Value::Zero => Ok(false),
            Value::One => Ok(true),
            other => Err(format!("cannot convert {} to bool", other)),
        }
    }

    pub fn from_char(c: char) -> Option<Value> {
        match c {
            '0' => Some(Value::Zero),
            '1' => Some(Value::One),
            'x' | 'X' => Some(Value::X),
            'z' | 'Z' => Some(Value::Z),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Zero => write!(f, "0"),
            Value::One => write!(f, "1"),
            Value::X => write!(f, "x"),
            Value::Z => write!(f, "z"),
        }
    }
}

/// Converts `value` to a digit vector of exactly `width` digits, LSB first.
pub fn values_from_u64(value: u64, width: usize) -> Result<Vec<Value>, String> {
    if width == 0 {
        return Err("cannot make a zero-width value vector".to_string());
    }
    if width < 64 && (value >> width) != 0 {
        return Err(format!(
            "value {} does not fit in {} bit(s)",
            value, width
        ));
    }
    Ok((0..width)
        .map(|i| {
            if i < 64 {
                Value::from_bool((value >> i) & 1 == 1)
            } else {
                Value::Zero
            }
        })
        .collect())
}

/// Converts an LSB-first digit vector back to a `u64`.
///
/// Fails when the vector is empty, wider than 64 digits, or contains an
/// unknown digit.
pub fn values_to_u64(values: &[Value]) -> Result<u64, String> {
    if values.is_empty() {
        return Err("cannot convert an empty value vector".to_string());
    }
    if values.len() > 64 {
        return Err(format!(
            "cannot convert {} digits to u64; max is 64",
            values.len()
        ));
    }
    let mut result: u64 = 0;
    for (i, v) in values.iter().enumerate() {
        match v {
            Value::Zero => {}
            Value::One => result |= 1u64 << i,
            other => {
                return Err(format!("digit {} is {}; not a Boolean value", i, other));
            }
        }
    }
    Ok(result)
}

/// Renders an LSB-first digit vector as an MSB-first digit string, e.g.
/// `[One, Zero, X]` becomes `"x01"`.
pub fn values_to_bin_string(values: &[Value]) -> String {
    values.iter().rev().map(|v| v.to_string()).collect()
}

/// Parses an MSB-first digit string (digits `0`, `1`, `x`, `z`) into an
/// LSB-first digit vector.
pub fn values_from_bin_string(s: &str) -> Result<Vec<Value>, String> {
    if s.is_empty() {
        return Err("empty digit string".to_string());
    }
    let mut values = Vec::with_capacity(s.len());
    for c in s.chars().rev() {
        match Value::from_char(c) {
            Some(v) => values.push(v),
            None => return Err(format!("invalid digit {:?} in {:?}", c, s)),
        }
    }
    Ok(values)
}

/// True when every digit is a Boolean value.
pub fn all_known(values: &[Value]) -> bool {
    values.iter().all(|v| v.is_known())
}

pub fn all_zeros(values: &[Value]) -> bool {
    values.iter().all(|v| *v == Value::Zero)
}

pub fn all_ones(values: &[Value]) -> bool {
    values.iter().all(|v| *v == Value::One)
}
