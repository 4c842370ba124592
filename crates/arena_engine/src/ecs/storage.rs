//! Component storage columns
//!
//! Each component type gets one column. Values live densely in a slot map so
//! iteration touches contiguous memory, and a side table maps entities to
//! their slot.

use super::{Component, Entity};
use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::collections::HashMap;

new_key_type! {
    /// Slot of a component value inside its column
    pub struct ComponentKey;
}

#[derive(Debug)]
struct Slot<T> {
    owner: Entity,
    value: T,
}

/// Dense storage for all instances of one component type
#[derive(Debug)]
pub struct ComponentStorage<T: Component> {
    components: SlotMap<ComponentKey, Slot<T>>,
    by_entity: HashMap<Entity, ComponentKey>,
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty column
    pub fn new() -> Self {
        Self {
            components: SlotMap::with_key(),
            by_entity: HashMap::new(),
        }
    }

    /// Insert or replace the component of `entity`, returning the old value
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&key) = self.by_entity.get(&entity) {
            if let Some(slot) = self.components.get_mut(key) {
                return Some(std::mem::replace(&mut slot.value, value));
            }
        }

        let key = self.components.insert(Slot { owner: entity, value });
        self.by_entity.insert(entity, key);
        None
    }

    /// Remove the component of `entity`
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let key = self.by_entity.remove(&entity)?;
        self.components.remove(key).map(|slot| slot.value)
    }

    /// Get the component of `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let key = self.by_entity.get(&entity)?;
        self.components.get(*key).map(|slot| &slot.value)
    }

    /// Get the component of `entity` mutably
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let key = self.by_entity.get(&entity)?;
        self.components.get_mut(*key).map(|slot| &mut slot.value)
    }

    /// Iterate over `(owner, component)` in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.values().map(|slot| (slot.owner, &slot.value))
    }

    /// Iterate mutably over `(owner, component)` in storage order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.components
            .values_mut()
            .map(|slot| (slot.owner, &mut slot.value))
    }
}

/// Type-erased view of a [`ComponentStorage`] used by the entity manager
pub(crate) trait ComponentColumn: Any {
    /// Drop the component of `entity`, returning whether one existed
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Whether `entity` has a value in this column
    fn contains(&self, entity: Entity) -> bool;

    /// Number of stored values
    fn len(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentColumn for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.by_entity.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
