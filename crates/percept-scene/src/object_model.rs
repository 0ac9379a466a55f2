//! ObjectModel - the tree of scene items
//!
//! Items are addressed by stable [`ItemId`]s. Sibling names are unique, so a
//! (parent, name) pair identifies at most one item. Removing an item removes
//! its subtree, children first.

use crate::affordance::ServerAffordance;
use crate::frame::FrameItem;
use crate::item::{ContainerItem, NAME_PROPERTY};
use crate::object::SceneObject;
use percept_core::{DataSetId, ItemId, PerceptError, Result};
use percept_props::PropertyValue;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct ObjectModel {
    objects: HashMap<ItemId, SceneObject>,
    /// child -> parent
    parents: HashMap<ItemId, ItemId>,
    /// parent -> children, in insertion order
    children: HashMap<ItemId, Vec<ItemId>>,
    roots: Vec<ItemId>,
    /// Affordances that receive server updates
    affordance_listeners: BTreeSet<ItemId>,
}

impl ObjectModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` under `parent` (or as a root)
    pub fn add_to_object_model(
        &mut self,
        object: impl Into<SceneObject>,
        parent: Option<ItemId>,
    ) -> Result<ItemId> {
        let object = object.into();
        let name = object.name();

        if let Some(parent) = parent {
            if !self.objects.contains_key(&parent) {
                return Err(PerceptError::ItemNotFound(parent.to_string()));
            }
        }
        if self.sibling_named(parent, &name, None).is_some() {
            return Err(PerceptError::DuplicateItemName(name));
        }

        let id = object.id();
        if matches!(object, SceneObject::Affordance(_)) {
            self.affordance_listeners.insert(id);
        }
        match parent {
            Some(parent) => {
                self.parents.insert(id, parent);
                self.children.entry(parent).or_default().push(id);
            }
            None => self.roots.push(id),
        }
        log::debug!("object model: added {} '{}' ({})", object.kind_name(), name, id);
        self.objects.insert(id, object);

        Ok(id)
    }

    pub fn add_container(&mut self, name: impl Into<String>, parent: Option<ItemId>) -> Result<ItemId> {
        self.add_to_object_model(ContainerItem::new(name)?, parent)
    }

    /// Return the first item named `name` anywhere in the tree, or add a new
    /// container with that name under `parent`
    pub fn get_or_create_container(&mut self, name: &str, parent: Option<ItemId>) -> Result<ItemId> {
        match self.find_object_by_name(name) {
            Some(id) => Ok(id),
            None => self.add_container(name, parent),
        }
    }

    /// Remove an item and its whole subtree. Each removed item gets
    /// `on_remove_from_object_model` once, children before parents.
    pub fn remove_from_object_model(&mut self, id: ItemId) -> Result<()> {
        if !self.objects.contains_key(&id) {
            return Err(PerceptError::ItemNotFound(id.to_string()));
        }

        for child in self.children.get(&id).cloned().unwrap_or_default() {
            self.remove_from_object_model(child)?;
        }

        match self.parents.remove(&id) {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        self.children.remove(&id);
        self.affordance_listeners.remove(&id);

        if let Some(mut object) = self.objects.remove(&id) {
            object.on_remove_from_object_model();
            log::debug!("object model: removed '{}' ({})", object.name(), id);
        }
        Ok(())
    }

    pub fn get(&self, id: ItemId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn frame(&self, id: ItemId) -> Option<Rc<FrameItem>> {
        self.get(id).and_then(SceneObject::as_frame).cloned()
    }

    /// First item named `name`, depth first in insertion order
    pub fn find_object_by_name(&self, name: &str) -> Option<ItemId> {
        let mut stack: Vec<ItemId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.objects.get(&id).is_some_and(|o| o.name() == name) {
                return Some(id);
            }
            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    pub fn find_child(&self, parent: ItemId, name: &str) -> Option<ItemId> {
        self.sibling_named(Some(parent), name, None)
    }

    /// The frame child conventionally named "<item name> frame"
    pub fn child_frame(&self, id: ItemId) -> Option<Rc<FrameItem>> {
        let name = format!("{} frame", self.get(id)?.name());
        self.find_child(id, &name).and_then(|child| self.frame(child))
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.parents.get(&id).copied()
    }

    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    /// Set a property on an item. Renaming to a name a sibling already has
    /// is rejected.
    pub fn set_property(&mut self, id: ItemId, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        if name == NAME_PROPERTY {
            if let Some(new_name) = value.as_str() {
                if self.sibling_named(self.parent(id), new_name, Some(id)).is_some() {
                    return Err(PerceptError::DuplicateItemName(new_name.to_string()));
                }
            }
        }

        self.objects
            .get_mut(&id)
            .ok_or_else(|| PerceptError::ItemNotFound(id.to_string()))?
            .set_property(name, value)
    }

    pub fn find_object_by_data_set(&self, data_set: DataSetId) -> Option<ItemId> {
        self.objects
            .iter()
            .find(|(_, o)| o.has_data_set(data_set))
            .map(|(id, _)| *id)
    }

    pub fn registered_affordances(&self) -> Vec<ItemId> {
        self.affordance_listeners.iter().copied().collect()
    }

    /// Hand a server update to one affordance, which adopts the uid if it has none
    pub fn apply_server_affordance(&mut self, id: ItemId, update: &ServerAffordance) -> Result<()> {
        self.objects
            .get_mut(&id)
            .and_then(SceneObject::as_affordance_mut)
            .ok_or_else(|| PerceptError::ItemNotFound(id.to_string()))?
            .on_server_affordance_update(update)
    }

    /// Route a server update to every registered affordance with a matching uid.
    /// Returns how many affordances received it.
    pub fn dispatch_server_affordance(&mut self, update: &ServerAffordance) -> Result<usize> {
        let targets: Vec<ItemId> = self
            .affordance_listeners
            .iter()
            .copied()
            .filter(|id| {
                self.objects
                    .get(id)
                    .and_then(SceneObject::as_affordance)
                    .and_then(|a| a.uid())
                    == Some(update.uid)
            })
            .collect();

        if targets.is_empty() {
            log::warn!("server affordance update for unknown uid {}", update.uid);
        }
        for id in &targets {
            self.apply_server_affordance(*id, update)?;
        }
        Ok(targets.len())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.objects.contains_key(&id)
    }

    fn sibling_named(&self, parent: Option<ItemId>, name: &str, except: Option<ItemId>) -> Option<ItemId> {
        let siblings = match parent {
            Some(parent) => self.children(parent),
            None => &self.roots,
        };
        siblings.iter().copied().find(|id| {
            Some(*id) != except && self.objects.get(id).is_some_and(|o| o.name() == name)
        })
    }
}
