//! Ordered, validated property storage

use crate::attributes::PropertyAttributes;
use crate::validation::validate_property_value;
use crate::value::PropertyValue;
use percept_core::{Color, PerceptError, Result};
use serde::{Deserialize, Serialize};

/// A single named property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    /// The value the property was registered with; fixes its type
    pub default: PropertyValue,
    pub attributes: PropertyAttributes,
}

/// Properties of one item, kept in registration order for display
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertySet {
    properties: Vec<Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new property. The default value is validated like any other.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        default: impl Into<PropertyValue>,
        attributes: PropertyAttributes,
    ) -> Result<()> {
        let name = name.into();
        if self.has_property(&name) {
            return Err(PerceptError::DuplicateProperty(name));
        }

        let default = default.into();
        let value = validate_property_value(&name, &default, &attributes, default.clone())?;
        self.properties.push(Property {
            name,
            default: value.clone(),
            value,
            attributes,
        });
        Ok(())
    }

    /// Validate and store a new value. On error the previous value is kept.
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let property = self
            .properties
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| PerceptError::UnknownProperty(name.to_string()))?;

        property.value =
            validate_property_value(name, &property.default, &property.attributes, value.into())?;
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name).map(|p| &p.value)
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn attributes(&self, name: &str) -> Option<&PropertyAttributes> {
        self.get(name).map(|p| &p.attributes)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_property(name).and_then(PropertyValue::as_bool)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get_property(name).and_then(PropertyValue::as_float)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_property(name).and_then(PropertyValue::as_str)
    }

    pub fn get_color(&self, name: &str) -> Option<Color> {
        self.get_property(name).and_then(PropertyValue::as_color)
    }
}
