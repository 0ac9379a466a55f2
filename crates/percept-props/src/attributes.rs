//! Property attributes

use serde::{Deserialize, Serialize};

/// Presentation and validation hints for a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    /// Number of decimals shown by numeric editors
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default = "default_single_step")]
    pub single_step: f64,
    #[serde(default)]
    pub hidden: bool,
    /// Allowed values for enum properties
    #[serde(default)]
    pub enum_names: Vec<String>,
}

fn default_decimals() -> u32 {
    5
}

fn default_single_step() -> f64 {
    1.0
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            minimum: None,
            maximum: None,
            single_step: default_single_step(),
            hidden: false,
            enum_names: Vec::new(),
        }
    }
}

impl PropertyAttributes {
    /// Attributes for a numeric property bounded to `[minimum, maximum]`
    pub fn range(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Default::default()
        }
    }

    /// Attributes for an enum property
    pub fn enumeration<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            enum_names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_single_step(mut self, single_step: f64) -> Self {
        self.single_step = single_step;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let attrs = PropertyAttributes::range(0.0, 1.0)
            .with_decimals(2)
            .with_single_step(0.1);
        assert_eq!(attrs.minimum, Some(0.0));
        assert_eq!(attrs.maximum, Some(1.0));
        assert_eq!(attrs.decimals, 2);
        assert!(!attrs.hidden);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let attrs: PropertyAttributes = toml::from_str(
            r#"
            minimum = 1.0
            maximum = 20.0
            decimals = 0
            "#,
        )
        .unwrap();

        assert_eq!(attrs.decimals, 0);
        assert_eq!(attrs.single_step, 1.0);
        assert!(attrs.enum_names.is_empty());
    }
}
