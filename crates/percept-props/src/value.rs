//! Typed property values

use percept_core::Color;
use serde::{Deserialize, Serialize};

/// The value held by a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Color(Color),
    Enum(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::Str(_) => "string",
            PropertyValue::Color(_) => "color",
            PropertyValue::Enum(_) => "enum",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value; integers widen to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(n) => Some(*n),
            PropertyValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// String contents of `Str` and `Enum` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) | PropertyValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(3).as_float(), Some(3.0));
        assert_eq!(PropertyValue::from(0.5).as_int(), None);
        assert_eq!(PropertyValue::Enum("fixed".into()).as_str(), Some("fixed"));
        assert_eq!(PropertyValue::from(Color::RED).as_color(), Some(Color::RED));
    }
}
