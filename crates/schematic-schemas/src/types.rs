//! Schema type names and value coercion
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use schematic_core::Value;
use serde::Serialize;
use std::fmt;

/// Type named by a schema's `type` or `disallowed` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    Any,
    Unknown,
}

impl Type {
    /// Look up a type by its schema name, ignoring case
    pub fn by_name(name: &str) -> Type {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => Type::String,
            "number" => Type::Number,
            "integer" => Type::Integer,
            "boolean" => Type::Boolean,
            "object" => Type::Object,
            "array" => Type::Array,
            "null" => Type::Null,
            "any" => Type::Any,
            _ => Type::Unknown,
        }
    }

    /// Runtime type of a value. Doubles are `Number`; integers are `Integer`.
    pub fn type_for(value: &Value) -> Type {
        match value {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Boolean,
            Value::Integer(_) => Type::Integer,
            Value::Double(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Document(_) => Type::Object,
            Value::Array(_) => Type::Array,
        }
    }

    /// Types named by a string or an array of strings. Non-string entries
    /// are skipped.
    pub fn types_with_names(value: &Value) -> Vec<Type> {
        match value {
            Value::String(name) => vec![Type::by_name(name)],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(Type::by_name)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::String => "string",
            Type::Number => "number",
            Type::Integer => "integer",
            Type::Boolean => "boolean",
            Type::Object => "object",
            Type::Array => "array",
            Type::Null => "null",
            Type::Any => "any",
            Type::Unknown => "unknown",
        }
    }

    /// Whether a value of the `actual` type satisfies this type
    pub fn is_equivalent(&self, actual: Type) -> bool {
        match self {
            Type::Any => true,
            Type::Number => matches!(actual, Type::Number | Type::Integer),
            expected => *expected == actual,
        }
    }

    /// Best-effort conversion of `value` (of the `actual` type) into this
    /// type. `None` when no lossless conversion exists.
    pub fn convert_value_from(&self, value: &Value, actual: Type) -> Option<Value> {
        match (self, value) {
            (Type::String, Value::Integer(i)) => Some(Value::String(i.to_string())),
            (Type::String, Value::Double(d)) => Some(Value::String(d.to_string())),
            (Type::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Type::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::Integer),
            (Type::Integer, Value::Double(d)) if actual == Type::Number => integral(*d),
            (Type::Number, Value::String(s)) => parse_number(s.trim()),
            (Type::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn integral(d: f64) -> Option<Value> {
    if d.is_finite() && d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 {
        Some(Value::Integer(d as i64))
    } else {
        None
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .map(Value::Double)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(Type::by_name("String"), Type::String);
        assert_eq!(Type::by_name("INTEGER"), Type::Integer);
        assert_eq!(Type::by_name("any"), Type::Any);
        assert_eq!(Type::by_name("date"), Type::Unknown);
    }

    #[test]
    fn test_type_for_values() {
        assert_eq!(Type::type_for(&Value::Integer(1)), Type::Integer);
        assert_eq!(Type::type_for(&Value::Double(1.5)), Type::Number);
        assert_eq!(Type::type_for(&Value::Bool(true)), Type::Boolean);
        assert_eq!(Type::type_for(&Value::Null), Type::Null);
    }

    #[test]
    fn test_types_with_names() {
        let names = Value::from(vec![Value::from("integer"), Value::Integer(3), Value::from("string")]);
        assert_eq!(Type::types_with_names(&names), vec![Type::Integer, Type::String]);
        assert_eq!(Type::types_with_names(&Value::from("null")), vec![Type::Null]);
        assert!(Type::types_with_names(&Value::Bool(true)).is_empty());
    }

    #[test]
    fn test_equivalence() {
        assert!(Type::Number.is_equivalent(Type::Integer));
        assert!(!Type::Integer.is_equivalent(Type::Number));
        assert!(Type::Any.is_equivalent(Type::Array));
        assert!(Type::String.is_equivalent(Type::String));
        assert!(!Type::String.is_equivalent(Type::Boolean));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(
            Type::Integer.convert_value_from(&Value::from(" 3 "), Type::String),
            Some(Value::Integer(3))
        );
        assert_eq!(
            Type::Integer.convert_value_from(&Value::Double(4.0), Type::Number),
            Some(Value::Integer(4))
        );
        assert_eq!(Type::Integer.convert_value_from(&Value::Double(4.5), Type::Number), None);
        assert_eq!(
            Type::Number.convert_value_from(&Value::from("2.5"), Type::String),
            Some(Value::Double(2.5))
        );
        assert_eq!(
            Type::Number.convert_value_from(&Value::from("7"), Type::String),
            Some(Value::Integer(7))
        );
        assert_eq!(
            Type::Boolean.convert_value_from(&Value::from("TRUE"), Type::String),
            Some(Value::Bool(true))
        );
        assert_eq!(
            Type::String.convert_value_from(&Value::Integer(12), Type::Integer),
            Some(Value::from("12"))
        );
        assert_eq!(Type::Integer.convert_value_from(&Value::from("abc"), Type::String), None);
        assert_eq!(Type::Integer.convert_value_from(&Value::Bool(true), Type::Boolean), None);
        assert_eq!(Type::Number.convert_value_from(&Value::from("NaN"), Type::String), None);
    }

    #[test]
    fn test_integral_doubles_stay_in_range() {
        let two_pow_63 = 9_223_372_036_854_775_808.0;
        assert_eq!(Type::Integer.convert_value_from(&Value::Double(two_pow_63), Type::Number), None);
        assert_eq!(
            Type::Integer.convert_value_from(&Value::Double(i64::MIN as f64), Type::Number),
            Some(Value::Integer(i64::MIN))
        );
    }
}
