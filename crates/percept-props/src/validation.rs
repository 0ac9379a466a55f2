//! Validation of property values against a property's type and attributes

use crate::attributes::PropertyAttributes;
use crate::value::PropertyValue;
use percept_core::{PerceptError, Result};

/// Validate `value` for the property `name`, whose type is fixed by `default`.
///
/// Returns the value to store: integers assigned to float properties are
/// widened, and strings assigned to enum properties become enum values.
pub fn validate_property_value(
    name: &str,
    default: &PropertyValue,
    attributes: &PropertyAttributes,
    value: PropertyValue,
) -> Result<PropertyValue> {
    match (default, value) {
        (PropertyValue::Bool(_), v @ PropertyValue::Bool(_)) => Ok(v),
        (PropertyValue::Int(_), PropertyValue::Int(n)) => {
            validate_range(name, n as f64, attributes)?;
            Ok(PropertyValue::Int(n))
        }
        (PropertyValue::Float(_), PropertyValue::Float(n)) => {
            validate_range(name, n, attributes)?;
            Ok(PropertyValue::Float(n))
        }
        (PropertyValue::Float(_), PropertyValue::Int(n)) => {
            // Allow integers where floats are expected
            validate_range(name, n as f64, attributes)?;
            Ok(PropertyValue::Float(n as f64))
        }
        (PropertyValue::Str(_), v @ PropertyValue::Str(_)) => Ok(v),
        (PropertyValue::Color(_), PropertyValue::Color(c)) => {
            let channels = c.to_array();
            if channels.iter().all(|ch| (0.0..=1.0).contains(ch)) {
                Ok(PropertyValue::Color(c))
            } else {
                Err(PerceptError::InvalidPropertyType {
                    property: name.to_string(),
                    expected: "color with channels in 0..=1".to_string(),
                    got: format!("{:?}", channels),
                })
            }
        }
        (PropertyValue::Enum(_), PropertyValue::Enum(s) | PropertyValue::Str(s)) => {
            validate_enum(name, &s, attributes)?;
            Ok(PropertyValue::Enum(s))
        }
        (expected, got) => Err(PerceptError::InvalidPropertyType {
            property: name.to_string(),
            expected: expected.type_name().to_string(),
            got: got.type_name().to_string(),
        }),
    }
}

fn validate_range(name: &str, value: f64, attributes: &PropertyAttributes) -> Result<()> {
    let min = attributes.minimum;
    let max = attributes.maximum;
    let below = min.is_some_and(|m| value < m);
    let above = max.is_some_and(|m| value > m);
    if below || above || value.is_nan() {
        return Err(PerceptError::ValueOutOfRange {
            property: name.to_string(),
            min: min.unwrap_or(f64::MIN),
            max: max.unwrap_or(f64::MAX),
            value,
        });
    }
    Ok(())
}

fn validate_enum(name: &str, value: &str, attributes: &PropertyAttributes) -> Result<()> {
    if attributes.enum_names.iter().any(|n| n == value) {
        Ok(())
    } else {
        Err(PerceptError::InvalidEnumValue {
            property: name.to_string(),
            value: value.to_string(),
            allowed: attributes.enum_names.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percept_core::Color;

    #[test]
    fn test_value_out_of_range() {
        let attrs = PropertyAttributes::range(0.0, 1.0);
        let result = validate_property_value("Alpha", &1.0.into(), &attrs, 1.5.into());
        assert!(matches!(result, Err(PerceptError::ValueOutOfRange { .. })));

        let result = validate_property_value("Alpha", &1.0.into(), &attrs, f64::NAN.into());
        assert!(matches!(result, Err(PerceptError::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_int_widens_to_float() {
        let attrs = PropertyAttributes::range(1.0, 20.0).with_decimals(0);
        let stored =
            validate_property_value("Point Size", &1.0.into(), &attrs, 7.into()).unwrap();
        assert_eq!(stored, PropertyValue::Float(7.0));
    }

    #[test]
    fn test_type_mismatch() {
        let attrs = PropertyAttributes::default();
        let result = validate_property_value("Visible", &true.into(), &attrs, 1.into());
        assert!(matches!(
            result,
            Err(PerceptError::InvalidPropertyType { ref expected, .. }) if expected == "bool"
        ));
    }

    #[test]
    fn test_enum_membership() {
        let attrs = PropertyAttributes::enumeration(["points", "surface"]);
        let default = PropertyValue::Enum("points".into());

        let stored = validate_property_value("Mode", &default, &attrs, "surface".into()).unwrap();
        assert_eq!(stored, PropertyValue::Enum("surface".into()));

        let result = validate_property_value("Mode", &default, &attrs, "wireframe".into());
        assert!(matches!(result, Err(PerceptError::InvalidEnumValue { .. })));
    }

    #[test]
    fn test_color_channels() {
        let attrs = PropertyAttributes::default();
        let default = PropertyValue::Color(Color::WHITE);
        assert!(validate_property_value("Color", &default, &attrs, Color::RED.into()).is_ok());

        let bad = Color::new(2.0, 0.0, 0.0, 1.0);
        assert!(validate_property_value("Color", &default, &attrs, bad.into())
            .unwrap_err()
            .is_invalid_value());
    }
}
