//! Rigid synchronization of a group of frames
//!
//! A [`FrameSync`] links any number of [`FrameItem`]s so that moving one of
//! them carries the others along rigidly. Each registered frame records a
//! base transform: its pose relative to an implicit anchor shared by the whole
//! group. When frame `S` moves, every other frame `E` is placed at
//!
//! ```text
//! E.base  then  S.base⁻¹  then  S.current
//! ```
//!
//! which keeps `S⁻¹·E` equal to `S.base⁻¹·E.base` for every pair.
//!
//! The group holds frames weakly. A frame dropped by its owner is pruned the
//! next time the group walks its entries; this is not an error.
//!
//! Frames registered with `ignore_incoming` are passive: their own motion
//! only refreshes their base transform and is not forwarded to peers. They
//! are still moved when another frame drives the group.

use crate::callbacks::{FlagGuard, SubscriptionId};
use crate::frame::FrameItem;
use percept_core::{ItemId, PerceptError, Result, Transform};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

struct FrameEntry {
    frame: Weak<FrameItem>,
    frame_id: ItemId,
    base_transform: Transform,
    subscription: SubscriptionId,
    ignore_incoming: bool,
}

#[derive(Default)]
struct SyncState {
    /// Keyed by registration order, so the reference entry used for base
    /// transforms is always the oldest live peer
    frames: RefCell<BTreeMap<u64, FrameEntry>>,
    next_entry_id: Cell<u64>,
    block_callbacks: Cell<bool>,
}

impl SyncState {
    fn prune(&self) {
        self.frames.borrow_mut().retain(|_, entry| {
            let alive = entry.frame.strong_count() > 0;
            if !alive {
                log::debug!("frame sync: pruning dropped frame {}", entry.frame_id);
            }
            alive
        });
    }

    fn find_entry(&self, frame_id: ItemId) -> Option<u64> {
        self.frames
            .borrow()
            .iter()
            .find(|(_, entry)| entry.frame_id == frame_id && entry.frame.strong_count() > 0)
            .map(|(key, _)| *key)
    }

    /// Pose of `frame` relative to the group anchor, measured against the
    /// first live peer. With no peers the frame's own pose is the anchor.
    fn compute_base_transform(&self, frame: &FrameItem) -> Transform {
        let current_delta = self.frames.borrow().values().find_map(|entry| {
            let peer = entry.frame.upgrade()?;
            if peer.id() == frame.id() {
                return None;
            }
            Some(entry.base_transform.inverse().then(&peer.transform()))
        });

        let current = frame.transform();
        match current_delta {
            Some(delta) => current.then(&delta.inverse()),
            None => current,
        }
    }

    fn on_frame_modified(&self, frame: &FrameItem) {
        if self.block_callbacks.get() {
            return;
        }

        self.prune();
        let Some(modified_key) = self.find_entry(frame.id()) else {
            debug_assert!(false, "FrameModified from unregistered frame {}", frame.id());
            log::warn!("frame sync: ignoring unregistered frame '{}'", frame.name());
            return;
        };

        let (source_base, ignore_incoming) = {
            let frames = self.frames.borrow();
            let entry = &frames[&modified_key];
            (entry.base_transform, entry.ignore_incoming)
        };

        if ignore_incoming {
            let base = self.compute_base_transform(frame);
            if let Some(entry) = self.frames.borrow_mut().get_mut(&modified_key) {
                entry.base_transform = base;
            }
            return;
        }

        let _blocked = FlagGuard::set(&self.block_callbacks);

        let source_current = frame.transform();
        let undo_source = source_base.inverse();
        let targets: Vec<(Rc<FrameItem>, Transform)> = self
            .frames
            .borrow()
            .iter()
            .filter(|(key, _)| **key != modified_key)
            .filter_map(|(_, entry)| {
                let target = entry.frame.upgrade()?;
                let moved = entry
                    .base_transform
                    .then(&undo_source)
                    .then(&source_current);
                Some((target, moved))
            })
            .collect();

        log::debug!(
            "frame sync: '{}' moved, updating {} peer(s)",
            frame.name(),
            targets.len()
        );
        for (target, transform) in targets {
            log::trace!("frame sync: moving '{}'", target.name());
            target.copy_frame(&transform);
        }
    }
}

/// Keeps a set of frames rigidly linked. See the module docs.
pub struct FrameSync {
    state: Rc<SyncState>,
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSync {
    pub fn new() -> Self {
        Self {
            state: Rc::new(SyncState::default()),
        }
    }

    /// Register `frame`. Registering a frame that is already in the group
    /// is a no-op and keeps its original base transform.
    pub fn add_frame(&self, frame: &Rc<FrameItem>, ignore_incoming: bool) {
        self.state.prune();
        if self.state.find_entry(frame.id()).is_some() {
            return;
        }

        let base_transform = self.state.compute_base_transform(frame);

        let state = Rc::downgrade(&self.state);
        let subscription = frame.connect_frame_modified(move |modified| {
            if let Some(state) = state.upgrade() {
                state.on_frame_modified(modified);
            }
        });

        let key = self.state.next_entry_id.get();
        self.state.next_entry_id.set(key + 1);
        self.state.frames.borrow_mut().insert(
            key,
            FrameEntry {
                frame: Rc::downgrade(frame),
                frame_id: frame.id(),
                base_transform,
                subscription,
                ignore_incoming,
            },
        );
        log::debug!(
            "frame sync: added '{}' (ignore_incoming = {})",
            frame.name(),
            ignore_incoming
        );
    }

    /// Register `frame` if there is one. Convenient with lookups such as
    /// [`crate::ObjectModel::child_frame`] that may find nothing.
    pub fn add_optional_frame(&self, frame: Option<&Rc<FrameItem>>, ignore_incoming: bool) {
        if let Some(frame) = frame {
            self.add_frame(frame, ignore_incoming);
        }
    }

    pub fn remove_frame(&self, frame: &FrameItem) -> Result<()> {
        self.state.prune();
        let key = self
            .state
            .find_entry(frame.id())
            .ok_or_else(|| PerceptError::FrameNotFound(frame.name()))?;

        let entry = self.state.frames.borrow_mut().remove(&key);
        if let Some(entry) = entry {
            frame.disconnect_frame_modified(entry.subscription);
        }
        log::debug!("frame sync: removed '{}'", frame.name());
        Ok(())
    }

    pub fn contains(&self, frame: &FrameItem) -> bool {
        self.state.find_entry(frame.id()).is_some()
    }

    /// Number of live frames in the group
    pub fn len(&self) -> usize {
        self.state.prune();
        self.state.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The recorded offset of `frame` from the group anchor
    pub fn base_transform(&self, frame: &FrameItem) -> Option<Transform> {
        let key = self.state.find_entry(frame.id())?;
        self.state
            .frames
            .borrow()
            .get(&key)
            .map(|entry| entry.base_transform)
    }

    pub fn is_ignoring_incoming(&self, frame: &FrameItem) -> Option<bool> {
        let key = self.state.find_entry(frame.id())?;
        self.state
            .frames
            .borrow()
            .get(&key)
            .map(|entry| entry.ignore_incoming)
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        for entry in self.state.frames.borrow().values() {
            if let Some(frame) = entry.frame.upgrade() {
                frame.disconnect_frame_modified(entry.subscription);
            }
        }
    }
}
