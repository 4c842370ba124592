//! Component type registry and per-type entity index
//!
//! The registry hands out a [`ComponentTypeId`] the first time a Rust type is
//! seen and keeps, for every type, the ordered set of entities currently
//! holding it. Queries intersect these sets.

use super::{Component, ComponentTypeId, Entity};
use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap};

/// Maps component types to ids and ids to their holders
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
    index: Vec<BTreeSet<Entity>>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, returning its id; repeated calls return the same id
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return id;
        }

        let raw = u16::try_from(self.names.len()).unwrap_or(u16::MAX);
        let id = ComponentTypeId::new(raw);
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(type_name::<T>());
        self.index.push(BTreeSet::new());
        log::trace!("Registered component type {} as {}", type_name::<T>(), id);
        id
    }

    /// Id of `T`, if it has been registered
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Rust type name behind `id`
    pub fn type_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of registered types
    pub fn type_count(&self) -> usize {
        self.names.len()
    }

    /// Record that `entity` now holds a component of type `id`
    pub fn register_component(&mut self, entity: Entity, id: ComponentTypeId) {
        if let Some(holders) = self.index.get_mut(id.index()) {
            holders.insert(entity);
        }
    }

    /// Record that `entity` no longer holds a component of type `id`
    pub fn unregister_component(&mut self, entity: Entity, id: ComponentTypeId) {
        if let Some(holders) = self.index.get_mut(id.index()) {
            holders.remove(&entity);
        }
    }

    /// Remove `entity` from every type's holder set
    pub fn unregister_entity(&mut self, entity: Entity) {
        for holders in &mut self.index {
            holders.remove(&entity);
        }
    }

    /// Whether the index records `entity` as holding type `id`
    pub fn has_component(&self, entity: Entity, id: ComponentTypeId) -> bool {
        self.index
            .get(id.index())
            .is_some_and(|holders| holders.contains(&entity))
    }

    /// Number of entities holding type `id`
    pub fn holder_count(&self, id: ComponentTypeId) -> usize {
        self.index.get(id.index()).map_or(0, BTreeSet::len)
    }

    /// Entities holding every type in `ids`, in ascending id order
    ///
    /// Iterates the smallest holder set and checks the others. An empty
    /// `ids` slice, or any unknown id, yields nothing.
    pub fn get_entities_with(&self, ids: &[ComponentTypeId]) -> Vec<Entity> {
        let mut sets = Vec::with_capacity(ids.len());
        for id in ids {
            match self.index.get(id.index()) {
                Some(holders) => sets.push(holders),
                None => return Vec::new(),
            }
        }

        sets.sort_by_key(|holders| holders.len());
        let Some((smallest, rest)) = sets.split_first() else {
            return Vec::new();
        };

        smallest
            .iter()
            .filter(|entity| rest.iter().all(|holders| holders.contains(entity)))
            .copied()
            .collect()
    }

    /// Entities holding at least one type in `ids`, in ascending id order
    pub fn get_entities_with_any(&self, ids: &[ComponentTypeId]) -> Vec<Entity> {
        let mut union = BTreeSet::new();
        for holders in ids.iter().filter_map(|id| self.index.get(id.index())) {
            union.extend(holders.iter().copied());
        }
        union.into_iter().collect()
    }
}
