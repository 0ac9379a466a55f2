//! Render destinations
//!
//! The renderer itself lives outside this crate. Items only need to register
//! and unregister their actor with a view and ask it to redraw.

use percept_core::ItemId;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A render destination that items can be attached to
pub trait RenderView {
    fn name(&self) -> &str;
    fn add_actor(&self, actor: ItemId);
    fn remove_actor(&self, actor: ItemId);
    fn render(&self);
}

/// Shared handle to a view. Two handles are equal when they point at the same view.
#[derive(Clone)]
pub struct ViewHandle(Rc<dyn RenderView>);

impl ViewHandle {
    pub fn new(view: impl RenderView + 'static) -> Self {
        Self(Rc::new(view))
    }

    pub fn from_rc(view: Rc<dyn RenderView>) -> Self {
        Self(view)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn add_actor(&self, actor: ItemId) {
        self.0.add_actor(actor);
    }

    pub fn remove_actor(&self, actor: ItemId) {
        self.0.remove_actor(actor);
    }

    pub fn render(&self) {
        self.0.render();
    }

    fn data_ptr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for ViewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.data_ptr() == other.data_ptr()
    }
}

impl Eq for ViewHandle {}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewHandle({})", self.name())
    }
}

/// An offscreen view that tracks its actors and counts render requests
#[derive(Debug, Default)]
pub struct HeadlessView {
    name: String,
    actors: RefCell<Vec<ItemId>>,
    render_count: Cell<usize>,
}

impl HeadlessView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn actors(&self) -> Vec<ItemId> {
        self.actors.borrow().clone()
    }

    pub fn contains_actor(&self, actor: ItemId) -> bool {
        self.actors.borrow().contains(&actor)
    }

    pub fn render_count(&self) -> usize {
        self.render_count.get()
    }
}

impl RenderView for HeadlessView {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_actor(&self, actor: ItemId) {
        let mut actors = self.actors.borrow_mut();
        if !actors.contains(&actor) {
            actors.push(actor);
        }
    }

    fn remove_actor(&self, actor: ItemId) {
        self.actors.borrow_mut().retain(|a| *a != actor);
    }

    fn render(&self) {
        self.render_count.set(self.render_count.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        let a = ViewHandle::new(HeadlessView::new("main"));
        let b = ViewHandle::new(HeadlessView::new("main"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_headless_view_tracks_actors() {
        let view = Rc::new(HeadlessView::new("main"));
        let handle = ViewHandle::from_rc(view.clone());
        let actor = ItemId::new();

        handle.add_actor(actor);
        handle.add_actor(actor);
        handle.render();
        assert_eq!(view.actors(), vec![actor]);
        assert_eq!(view.render_count(), 1);

        handle.remove_actor(actor);
        assert!(!view.contains_actor(actor));
    }
}
