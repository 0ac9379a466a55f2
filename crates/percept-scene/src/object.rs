//! The closed set of items the object model can hold

use crate::affordance::AffordanceItem;
use crate::frame::FrameItem;
use crate::item::ContainerItem;
use crate::poly_data::PolyDataItem;
use crate::view::ViewHandle;
use percept_core::{DataSetId, ItemId, PerceptError, Result};
use percept_props::{PropertySet, PropertyValue};
use std::rc::Rc;

/// An item in the object model.
///
/// Frames are shared (`Rc`) so sync groups and affordances can refer to them;
/// everything else is owned by the model.
#[derive(Debug)]
pub enum SceneObject {
    Container(ContainerItem),
    PolyData(PolyDataItem),
    Frame(Rc<FrameItem>),
    Affordance(AffordanceItem),
}

impl SceneObject {
    pub fn id(&self) -> ItemId {
        match self {
            SceneObject::Container(c) => c.item().id(),
            SceneObject::PolyData(p) => p.id(),
            SceneObject::Frame(f) => f.id(),
            SceneObject::Affordance(a) => a.id(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            SceneObject::Container(c) => c.item().name().to_string(),
            SceneObject::PolyData(p) => p.name().to_string(),
            SceneObject::Frame(f) => f.name(),
            SceneObject::Affordance(a) => a.name().to_string(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SceneObject::Container(_) => "container",
            SceneObject::PolyData(_) => "poly_data",
            SceneObject::Frame(_) => "frame",
            SceneObject::Affordance(_) => "affordance",
        }
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        match self {
            SceneObject::Container(c) => c.item().property(name).cloned(),
            SceneObject::PolyData(p) => p.property(name).cloned(),
            SceneObject::Frame(f) => f.property(name),
            SceneObject::Affordance(a) => a.property(name).cloned(),
        }
    }

    pub fn property_names(&self) -> Vec<String> {
        let names = |props: &PropertySet| -> Vec<String> {
            props
                .property_names()
                .into_iter()
                .map(String::from)
                .collect()
        };
        match self {
            SceneObject::Container(c) => names(c.item().properties()),
            SceneObject::PolyData(p) => names(p.item().properties()),
            SceneObject::Frame(f) => f.property_names(),
            SceneObject::Affordance(a) => names(a.poly().item().properties()),
        }
    }

    /// Set a property and apply its effect. Name uniqueness is checked by
    /// [`ObjectModel::set_property`](crate::ObjectModel::set_property).
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        match self {
            SceneObject::Container(c) => c.item_mut().set_property(name, value),
            SceneObject::PolyData(p) => p.set_property(name, value),
            SceneObject::Frame(f) => f.set_property(name, value),
            SceneObject::Affordance(a) => a.set_property(name, value),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            SceneObject::Container(c) => c.item().is_visible(),
            SceneObject::PolyData(p) => p.is_visible(),
            SceneObject::Frame(f) => f.is_visible(),
            SceneObject::Affordance(a) => a.poly().is_visible(),
        }
    }

    pub fn views(&self) -> Vec<ViewHandle> {
        match self {
            SceneObject::Container(_) => Vec::new(),
            SceneObject::PolyData(p) => p.views().to_vec(),
            SceneObject::Frame(f) => f.views(),
            SceneObject::Affordance(a) => a.views().to_vec(),
        }
    }

    /// Containers have no actor; adding one to a view does nothing
    pub fn add_to_view(&mut self, view: &ViewHandle) {
        match self {
            SceneObject::Container(_) => {}
            SceneObject::PolyData(p) => p.add_to_view(view),
            SceneObject::Frame(f) => f.add_to_view(view),
            SceneObject::Affordance(a) => a.add_to_view(view),
        }
    }

    pub fn remove_from_view(&mut self, view: &ViewHandle) -> Result<()> {
        match self {
            SceneObject::Container(_) => Err(PerceptError::NotAttached(view.name().to_string())),
            SceneObject::PolyData(p) => p.remove_from_view(view),
            SceneObject::Frame(f) => f.remove_from_view(view),
            SceneObject::Affordance(a) => a.remove_from_view(view),
        }
    }

    pub fn remove_from_all_views(&mut self) {
        match self {
            SceneObject::Container(_) => {}
            SceneObject::PolyData(p) => p.remove_from_all_views(),
            SceneObject::Frame(f) => f.remove_from_all_views(),
            SceneObject::Affordance(a) => a.poly_mut().remove_from_all_views(),
        }
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        match self {
            SceneObject::Affordance(a) => a.action_names(),
            _ => Vec::new(),
        }
    }

    pub fn on_action(&mut self, action: &str) -> Result<()> {
        match self {
            SceneObject::Affordance(a) => a.on_action(action),
            _ => Err(PerceptError::UnknownAction(action.to_string())),
        }
    }

    pub fn on_remove_from_object_model(&mut self) {
        match self {
            SceneObject::Container(_) => {}
            SceneObject::PolyData(p) => p.on_remove_from_object_model(),
            SceneObject::Frame(f) => f.on_remove_from_object_model(),
            SceneObject::Affordance(a) => a.on_remove_from_object_model(),
        }
    }

    pub fn has_data_set(&self, data_set: DataSetId) -> bool {
        match self {
            SceneObject::Container(_) => false,
            SceneObject::PolyData(p) => p.has_data_set(data_set),
            SceneObject::Frame(f) => f.poly_data_item().has_data_set(data_set),
            SceneObject::Affordance(a) => a.poly().has_data_set(data_set),
        }
    }

    pub fn as_frame(&self) -> Option<&Rc<FrameItem>> {
        match self {
            SceneObject::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_poly_data(&self) -> Option<&PolyDataItem> {
        match self {
            SceneObject::PolyData(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_poly_data_mut(&mut self) -> Option<&mut PolyDataItem> {
        match self {
            SceneObject::PolyData(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_affordance(&self) -> Option<&AffordanceItem> {
        match self {
            SceneObject::Affordance(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_affordance_mut(&mut self) -> Option<&mut AffordanceItem> {
        match self {
            SceneObject::Affordance(a) => Some(a),
            _ => None,
        }
    }
}

impl From<ContainerItem> for SceneObject {
    fn from(item: ContainerItem) -> Self {
        SceneObject::Container(item)
    }
}

impl From<PolyDataItem> for SceneObject {
    fn from(item: PolyDataItem) -> Self {
        SceneObject::PolyData(item)
    }
}

impl From<Rc<FrameItem>> for SceneObject {
    fn from(item: Rc<FrameItem>) -> Self {
        SceneObject::Frame(item)
    }
}

impl From<AffordanceItem> for SceneObject {
    fn from(item: AffordanceItem) -> Self {
        SceneObject::Affordance(item)
    }
}
