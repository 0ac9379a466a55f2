//! Base scene item: identity, properties and view membership

use crate::view::ViewHandle;
use percept_core::{ItemId, PerceptError, Result};
use percept_props::{PropertyAttributes, PropertySet, PropertyValue};

pub const NAME_PROPERTY: &str = "Name";
pub const VISIBLE_PROPERTY: &str = "Visible";

/// State shared by every item in the object model.
///
/// The item's actor is identified by its [`ItemId`] inside every view it is
/// attached to. Subtypes apply visual effects after a property change; this
/// type only stores and validates.
#[derive(Debug)]
pub struct SceneItem {
    id: ItemId,
    properties: PropertySet,
    views: Vec<ViewHandle>,
}

impl SceneItem {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let mut properties = PropertySet::new();
        properties.add_property(NAME_PROPERTY, name.into(), PropertyAttributes::default())?;
        Ok(Self {
            id: ItemId::new(),
            properties,
            views: Vec::new(),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.properties.get_str(NAME_PROPERTY).unwrap_or_default()
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        default: impl Into<PropertyValue>,
        attributes: PropertyAttributes,
    ) -> Result<()> {
        self.properties.add_property(name, default, attributes)
    }

    /// Validate and store a property value without applying any effect
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.properties.set_property(name, value)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get_property(name)
    }

    /// Items without a `Visible` property count as visible
    pub fn is_visible(&self) -> bool {
        self.properties.get_bool(VISIBLE_PROPERTY).unwrap_or(true)
    }

    pub fn views(&self) -> &[ViewHandle] {
        &self.views
    }

    pub fn is_attached(&self, view: &ViewHandle) -> bool {
        self.views.contains(view)
    }

    /// Attach to `view`. Attaching twice is a no-op.
    pub fn add_to_view(&mut self, view: &ViewHandle) {
        if self.is_attached(view) {
            return;
        }

        self.views.push(view.clone());
        view.add_actor(self.id);
        view.render();
    }

    pub fn remove_from_view(&mut self, view: &ViewHandle) -> Result<()> {
        let index = self
            .views
            .iter()
            .position(|v| v == view)
            .ok_or_else(|| PerceptError::NotAttached(view.name().to_string()))?;

        self.views.remove(index);
        view.remove_actor(self.id);
        view.render();
        Ok(())
    }

    pub fn remove_from_all_views(&mut self) {
        for view in std::mem::take(&mut self.views) {
            view.remove_actor(self.id);
            view.render();
        }
    }

    pub fn render_all_views(&self) {
        for view in &self.views {
            view.render();
        }
    }
}

/// A grouping node in the object model. Containers are never rendered.
#[derive(Debug)]
pub struct ContainerItem {
    item: SceneItem,
}

impl ContainerItem {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            item: SceneItem::new(name)?,
        })
    }

    pub fn item(&self) -> &SceneItem {
        &self.item
    }

    pub fn item_mut(&mut self) -> &mut SceneItem {
        &mut self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::HeadlessView;
    use std::rc::Rc;

    #[test]
    fn test_name_property() {
        let item = SceneItem::new("grid").unwrap();
        assert_eq!(item.name(), "grid");
        assert!(item.is_visible());
        assert!(matches!(
            SceneItem::new("x")
                .unwrap()
                .add_property(NAME_PROPERTY, "y", PropertyAttributes::default()),
            Err(PerceptError::DuplicateProperty(_))
        ));
    }

    #[test]
    fn test_add_to_view_is_idempotent() {
        let view = Rc::new(HeadlessView::new("main"));
        let handle = ViewHandle::from_rc(view.clone());
        let mut item = SceneItem::new("cloud").unwrap();

        item.add_to_view(&handle);
        item.add_to_view(&handle);

        assert_eq!(item.views().len(), 1);
        assert_eq!(view.actors(), vec![item.id()]);
        assert_eq!(view.render_count(), 1);
    }

    #[test]
    fn test_remove_from_view() {
        let view = Rc::new(HeadlessView::new("main"));
        let handle = ViewHandle::from_rc(view.clone());
        let mut item = SceneItem::new("cloud").unwrap();
        item.add_to_view(&handle);

        item.remove_from_view(&handle).unwrap();
        assert!(item.views().is_empty());
        assert!(!view.contains_actor(item.id()));
        assert_eq!(view.render_count(), 2);

        assert!(matches!(
            item.remove_from_view(&handle),
            Err(PerceptError::NotAttached(_))
        ));
    }

    #[test]
    fn test_remove_from_all_views() {
        let first = Rc::new(HeadlessView::new("first"));
        let second = Rc::new(HeadlessView::new("second"));
        let mut item = SceneItem::new("cloud").unwrap();
        item.add_to_view(&ViewHandle::from_rc(first.clone()));
        item.add_to_view(&ViewHandle::from_rc(second.clone()));

        item.remove_from_all_views();
        assert!(item.views().is_empty());
        assert!(first.actors().is_empty());
        assert!(second.actors().is_empty());
    }
}
