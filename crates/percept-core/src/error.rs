//! Error types for Percept

use thiserror::Error;

/// The main error type for Percept operations
#[derive(Debug, Error)]
pub enum PerceptError {
    #[error("Duplicate property: {0}")]
    DuplicateProperty(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Value out of range: {property} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        property: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value for {property}: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        property: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid property type for {property}: expected {expected}, got {got}")]
    InvalidPropertyType {
        property: String,
        expected: String,
        got: String,
    },

    #[error("Item is not attached to view: {0}")]
    NotAttached(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Duplicate item name: {0}")]
    DuplicateItemName(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing affordance parameter: {0}")]
    MissingAffordanceParam(String),

    #[error("Publish error: {0}")]
    PublishError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl PerceptError {
    /// True for the family of errors raised when a property value fails validation
    pub fn is_invalid_value(&self) -> bool {
        matches!(
            self,
            PerceptError::ValueOutOfRange { .. }
                | PerceptError::InvalidEnumValue { .. }
                | PerceptError::InvalidPropertyType { .. }
        )
    }
}

/// Result type alias for Percept operations
pub type Result<T> = std::result::Result<T, PerceptError>;

impl From<toml::de::Error> for PerceptError {
    fn from(err: toml::de::Error) -> Self {
        PerceptError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_family() {
        let err = PerceptError::ValueOutOfRange {
            property: "Alpha".to_string(),
            min: 0.0,
            max: 1.0,
            value: 2.0,
        };
        assert!(err.is_invalid_value());
        assert!(!PerceptError::DuplicateProperty("Alpha".to_string()).is_invalid_value());
        assert!(!PerceptError::NotAttached("main".to_string()).is_invalid_value());
    }

    #[test]
    fn test_error_messages() {
        let err = PerceptError::InvalidEnumValue {
            property: "Mode".to_string(),
            value: "spin".to_string(),
            allowed: vec!["fixed".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid enum value for Mode: spin is not one of [\"fixed\"]"
        );
    }
}
