//! Coordinate frames
//!
//! A [`FrameItem`] owns one [`Transform`] and is its only mutation path.
//! Every change made through [`FrameItem::set_transform`] or
//! [`FrameItem::update_transform`] is reported synchronously to the
//! FrameModified subscribers, in subscription order, before the call returns.
//! [`FrameItem::copy_frame`] is the exception: it blocks the notification so
//! that programmatic copies (as done by [`crate::FrameSync`]) never re-enter
//! their caller.

use crate::callbacks::{CallbackRegistry, FlagGuard, SubscriptionId};
use crate::poly_data::{LookupTable, PolyData, PolyDataItem};
use crate::view::ViewHandle;
use percept_core::{ItemId, Result, Transform};
use percept_props::{PropertyAttributes, PropertyValue};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

pub const SCALE_PROPERTY: &str = "Scale";
pub const EDIT_PROPERTY: &str = "Edit";

/// State of the interactive handle used to drag a frame around
#[derive(Debug, Clone, PartialEq)]
pub struct FrameWidget {
    pub enabled: bool,
    pub world_size: f64,
    /// View whose interactor drives the widget
    pub interactor: Option<ViewHandle>,
}

pub struct FrameItem {
    poly: RefCell<PolyDataItem>,
    transform: RefCell<Transform>,
    widget: RefCell<FrameWidget>,
    block_signals: Cell<bool>,
    observing: Cell<bool>,
    callbacks: CallbackRegistry<FrameItem>,
}

impl FrameItem {
    pub fn new(name: impl Into<String>, transform: Transform) -> Result<Rc<Self>> {
        let scale = 1.0;
        let mut poly = PolyDataItem::new(name, PolyData::axes(scale))?;
        poly.color_by(
            Some("Axes"),
            None,
            Some(LookupTable::new((0.0, 0.5)).with_hue_range((0.0, 0.667))),
        );
        poly.add_property(
            SCALE_PROPERTY,
            scale,
            PropertyAttributes::range(0.01, 100.0)
                .with_decimals(2)
                .with_single_step(0.1),
        )?;
        poly.add_property(EDIT_PROPERTY, false, PropertyAttributes::default())?;

        Ok(Rc::new(Self {
            poly: RefCell::new(poly),
            transform: RefCell::new(transform),
            widget: RefCell::new(FrameWidget {
                enabled: false,
                world_size: scale,
                interactor: None,
            }),
            block_signals: Cell::new(false),
            observing: Cell::new(true),
            callbacks: CallbackRegistry::new(),
        }))
    }

    pub fn id(&self) -> ItemId {
        self.poly.borrow().id()
    }

    pub fn name(&self) -> String {
        self.poly.borrow().name().to_string()
    }

    /// The dataset and actor state of the axes
    pub fn poly_data_item(&self) -> Ref<'_, PolyDataItem> {
        self.poly.borrow()
    }

    pub fn transform(&self) -> Transform {
        *self.transform.borrow()
    }

    /// Replace the transform and notify FrameModified subscribers
    pub fn set_transform(&self, transform: Transform) {
        *self.transform.borrow_mut() = transform;
        self.on_transform_modified();
    }

    /// Edit the transform in place and notify FrameModified subscribers
    pub fn update_transform(&self, edit: impl FnOnce(&mut Transform)) {
        edit(&mut *self.transform.borrow_mut());
        self.on_transform_modified();
    }

    /// Copy `source` into this frame without firing FrameModified, then
    /// re-render if visible. Propagating the change further is up to the caller.
    pub fn copy_frame(&self, source: &Transform) {
        {
            let _blocked = FlagGuard::set(&self.block_signals);
            self.set_transform(*source);
        }

        if self.is_visible() {
            self.render_all_views();
        }
    }

    pub fn connect_frame_modified(&self, handler: impl Fn(&FrameItem) + 'static) -> SubscriptionId {
        self.callbacks.connect(handler)
    }

    pub fn disconnect_frame_modified(&self, id: SubscriptionId) -> bool {
        self.callbacks.disconnect(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    fn on_transform_modified(&self) {
        if self.block_signals.get() || !self.observing.get() {
            return;
        }
        self.callbacks.process(self);
    }

    pub fn widget(&self) -> FrameWidget {
        self.widget.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.poly.borrow().is_visible()
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.poly.borrow().property(name).cloned()
    }

    pub fn property_names(&self) -> Vec<String> {
        self.poly
            .borrow()
            .item()
            .properties()
            .property_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.poly.borrow_mut().set_property(name, value)?;
        self.on_property_changed(name);
        Ok(())
    }

    fn on_property_changed(&self, name: &str) {
        match name {
            SCALE_PROPERTY => {
                let Some(scale) = self.property(name).and_then(|v| v.as_float()) else {
                    return;
                };
                self.widget.borrow_mut().world_size = scale;
                self.poly.borrow_mut().set_poly_data(PolyData::axes(scale));
            }
            EDIT_PROPERTY => {
                let edit = self
                    .property(name)
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                let view = self.poly.borrow().views().first().cloned();
                let mut widget = self.widget.borrow_mut();
                if edit && view.is_none() {
                    log::warn!("frame '{}' cannot be edited: not shown in any view", self.name());
                }
                widget.enabled = edit && view.is_some();
                widget.interactor = view;
            }
            _ => {}
        }
    }

    pub fn views(&self) -> Vec<ViewHandle> {
        self.poly.borrow().views().to_vec()
    }

    pub fn add_to_view(&self, view: &ViewHandle) {
        self.poly.borrow_mut().add_to_view(view);
    }

    pub fn remove_from_view(&self, view: &ViewHandle) -> Result<()> {
        self.poly.borrow_mut().remove_from_view(view)
    }

    pub fn remove_from_all_views(&self) {
        self.poly.borrow_mut().remove_from_all_views();
    }

    pub fn render_all_views(&self) {
        self.poly.borrow().render_all_views();
    }

    /// Detach from every view and stop reporting transform changes
    pub fn on_remove_from_object_model(&self) {
        self.poly.borrow_mut().on_remove_from_object_model();
        self.observing.set(false);

        let mut widget = self.widget.borrow_mut();
        widget.interactor = None;
        widget.enabled = false;
    }
}

impl fmt::Debug for FrameItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameItem")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("transform", &self.transform())
            .finish()
    }
}
