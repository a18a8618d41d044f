// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exact-kind checks for untyped JSON input.
//!
//! Profile files and API response bodies arrive as [`serde_json::Value`].
//! Before anything reads a field out of them, the field's kind is checked
//! against an expected set. Matching is exact: there is no coercion between
//! strings and numbers, and integers, floats and booleans are distinct kinds.

use std::fmt;

use serde_json::Value;

/// Runtime kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff the kind of `value` is one of `expected`.
pub fn check_type(value: &Value, expected: &[ValueKind]) -> bool {
    expected.contains(&ValueKind::of(value))
}

/// A value's kind was not among the expected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Operation that rejected the value (e.g. `load_profile`).
    pub operation: &'static str,
    /// Name of the offending field.
    pub field: String,
    pub expected: Vec<ValueKind>,
    pub found: ValueKind,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: Vec<&str> = self.expected.iter().map(ValueKind::as_str).collect();
        write!(
            f,
            "type mismatch in {}: field \"{}\" expected {}, found {}",
            self.operation,
            self.field,
            expected.join(" | "),
            self.found
        )
    }
}

impl std::error::Error for TypeMismatch {}

/// Guard form of [`check_type`]: logs and returns a [`TypeMismatch`] when
/// the value's kind is not expected. Callers must stop on `Err`.
pub fn require_type(
    value: &Value,
    expected: &[ValueKind],
    operation: &'static str,
    field: &str,
) -> Result<(), TypeMismatch> {
    if check_type(value, expected) {
        return Ok(());
    }
    let err = TypeMismatch {
        operation,
        field: field.to_owned(),
        expected: expected.to_vec(),
        found: ValueKind::of(value),
    };
    tracing::error!(operation, field, found = %err.found, "type error");
    Err(err)
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
