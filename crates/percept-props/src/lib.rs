//! Percept Props - Typed property sets for scene items
//!
//! Every scene item exposes its user-editable state (visibility, alpha,
//! color, scale, ...) as named properties. A property carries a default
//! value that fixes its type, plus attributes used both for validation and
//! for laying out a property panel.

mod attributes;
mod ik_parameters;
mod property_set;
mod validation;
mod value;

pub use attributes::PropertyAttributes;
pub use ik_parameters::IkParameters;
pub use property_set::{Property, PropertySet};
pub use validation::validate_property_value;
pub use value::PropertyValue;
