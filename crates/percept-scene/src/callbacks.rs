//! Synchronous callback lists and scoped flags

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`CallbackRegistry::connect`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<T> = Rc<dyn Fn(&T)>;

/// Ordered list of callbacks invoked synchronously with a `&T` argument.
///
/// Callbacks run in connection order. The list is snapshotted before a
/// dispatch, so a callback may connect or disconnect without invalidating
/// the iteration.
pub struct CallbackRegistry<T: ?Sized> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T: ?Sized> Default for CallbackRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> CallbackRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Returns false if `id` was not connected
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(cid, _)| *cid != id);
        callbacks.len() != before
    }

    pub fn process(&self, arg: &T) {
        let snapshot: Vec<Callback<T>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in snapshot {
            callback(arg);
        }
    }

    pub fn clear(&self) {
        self.callbacks.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for CallbackRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Sets a flag for the lifetime of the guard and restores the previous value on drop
pub(crate) struct FlagGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> FlagGuard<'a> {
    pub(crate) fn set(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
