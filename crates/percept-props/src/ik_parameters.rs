//! Inverse-kinematics solver options

use serde::{Deserialize, Serialize};

/// IK options where unset fields inherit from another parameter record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IkParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_pointwise: Option<bool>,
}

impl IkParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_to_defaults(&mut self) {
        self.use_pointwise = Some(true);
    }

    /// Copy every field of `other` that is unset here
    pub fn fill_in_with(&mut self, other: &IkParameters) {
        if self.use_pointwise.is_none() {
            self.use_pointwise = other.use_pointwise;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_in_with() {
        let mut defaults = IkParameters::new();
        defaults.set_to_defaults();

        let mut params = IkParameters::new();
        params.fill_in_with(&defaults);
        assert_eq!(params.use_pointwise, Some(true));

        let mut explicit = IkParameters {
            use_pointwise: Some(false),
        };
        explicit.fill_in_with(&defaults);
        assert_eq!(explicit.use_pointwise, Some(false));
    }
}
