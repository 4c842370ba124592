//! Entity lifecycle and component ownership
//!
//! The manager is the single owner of every entity record, every component
//! column and the per-type index. Each mutation updates all three together so
//! a query never sees an entity the record or the column disagrees with.
//!
//! Destruction is two-phase: [`EntityManager::destroy_entity`] only queues the
//! id, and [`EntityManager::process_destruction_queue`] removes queued
//! entities at a safe point between systems.
//!
//! Entities can also carry a unique name and any number of string tags. Both
//! are indexed the same way as components, so lookups never scan the table.

use super::query::ComponentSet;
use super::storage::{ComponentColumn, ComponentStorage};
use super::{Component, ComponentRegistry, ComponentTypeId, Entity};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug)]
struct EntityRecord {
    active: bool,
    components: BTreeSet<ComponentTypeId>,
    name: Option<String>,
    tags: BTreeSet<String>,
}

impl EntityRecord {
    fn new() -> Self {
        Self {
            active: true,
            components: BTreeSet::new(),
            name: None,
            tags: BTreeSet::new(),
        }
    }
}

/// Owns entities and their components
pub struct EntityManager {
    next_id: u32,
    records: BTreeMap<Entity, EntityRecord>,
    columns: Vec<Box<dyn ComponentColumn>>,
    registry: ComponentRegistry,
    destruction_queue: Vec<Entity>,
    pending: HashSet<Entity>,
    names: HashMap<String, Entity>,
    tags: HashMap<String, BTreeSet<Entity>>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            next_id: 0,
            records: BTreeMap::new(),
            columns: Vec::new(),
            registry: ComponentRegistry::new(),
            destruction_queue: Vec::new(),
            pending: HashSet::new(),
            names: HashMap::new(),
            tags: HashMap::new(),
        }
    }

    /// Create a new active entity with no components
    pub fn create_entity(&mut self) -> Entity {
        let mut entity = Entity::from_raw(self.next_id);
        while self.records.contains_key(&entity) {
            self.next_id = self.next_id.wrapping_add(1);
            entity = Entity::from_raw(self.next_id);
        }
        self.next_id = self.next_id.wrapping_add(1);

        self.records.insert(entity, EntityRecord::new());
        log::trace!("Created {entity}");
        entity
    }

    /// Create a new entity reachable through [`EntityManager::get_named`]
    ///
    /// A name already in use moves to the new entity.
    pub fn create_named_entity(&mut self, name: &str) -> Entity {
        let entity = self.create_entity();
        self.set_name(entity, name);
        entity
    }

    /// Create an entity with a caller-chosen id
    ///
    /// If the id is already in use the existing entity is kept untouched and
    /// returned. Later automatic ids never collide with explicit ones.
    pub fn create_entity_with_id(&mut self, entity: Entity) -> Entity {
        if self.records.contains_key(&entity) {
            log::warn!("{entity} already exists; keeping the existing entity");
            return entity;
        }

        self.records.insert(entity, EntityRecord::new());
        if entity.id() >= self.next_id {
            self.next_id = entity.id().wrapping_add(1);
        }
        entity
    }

    /// Queue `entity` for removal at the next destruction flush
    ///
    /// Unknown ids and ids already queued are ignored. A queued entity stays
    /// queryable until the flush.
    pub fn destroy_entity(&mut self, entity: Entity) {
        if !self.records.contains_key(&entity) {
            log::trace!("destroy_entity: {entity} does not exist");
            return;
        }
        if self.pending.insert(entity) {
            self.destruction_queue.push(entity);
        }
    }

    /// Remove `entity` and all of its components right away
    ///
    /// Returns `false` if the entity did not exist.
    pub fn destroy_entity_immediate(&mut self, entity: Entity) -> bool {
        let Some(record) = self.records.remove(&entity) else {
            return false;
        };

        for id in &record.components {
            if let Some(column) = self.columns.get_mut(id.index()) {
                column.remove_entity(entity);
            }
        }
        self.registry.unregister_entity(entity);
        self.pending.remove(&entity);

        if let Some(name) = &record.name {
            self.names.remove(name);
        }
        for tag in &record.tags {
            self.untag_index(entity, tag);
        }

        log::trace!("Destroyed {entity}");
        self.debug_check_entity(entity, None);
        true
    }

    /// Destroy every queued entity, returning the ids actually removed
    ///
    /// Entities queued while this runs wait for the next flush.
    pub fn drain_destruction_queue(&mut self) -> Vec<Entity> {
        let queued = std::mem::take(&mut self.destruction_queue);
        queued
            .into_iter()
            .filter(|&entity| self.destroy_entity_immediate(entity))
            .collect()
    }

    /// Destroy every queued entity, returning how many were removed
    pub fn process_destruction_queue(&mut self) -> usize {
        self.drain_destruction_queue().len()
    }

    /// Number of entities waiting for the destruction flush
    pub fn pending_destruction_count(&self) -> usize {
        self.destruction_queue.len()
    }

    /// Whether the entity exists and is not queued for destruction
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity) && !self.pending.contains(&entity)
    }

    /// Whether the entity exists, queued or not
    pub fn exists(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity)
    }

    /// Whether the entity is queued for destruction
    pub fn is_pending_destruction(&self, entity: Entity) -> bool {
        self.pending.contains(&entity)
    }

    /// Include or exclude the entity from queries
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(record) = self.records.get_mut(&entity) {
            record.active = active;
        }
    }

    /// Whether the entity takes part in queries
    pub fn is_active(&self, entity: Entity) -> bool {
        self.records.get(&entity).is_some_and(|record| record.active)
    }

    /// Number of existing entities, including ones queued for destruction
    pub fn entity_count(&self) -> usize {
        self.records.len()
    }

    /// All existing entities in ascending id order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.records.keys().copied()
    }

    /// Register `T` ahead of time so queries naming it resolve
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        let id = self.registry.register::<T>();
        if id.index() == self.columns.len() {
            self.columns.push(Box::new(ComponentStorage::<T>::new()));
        }
        id
    }

    /// Id of `T`, if any entity ever held one
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.registry.type_id::<T>()
    }

    /// The type registry and holder index
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Attach `component` to `entity`, replacing any previous value
    ///
    /// Returns `false` and changes nothing if the entity does not exist.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        if !self.records.contains_key(&entity) {
            log::trace!(
                "add_component: {entity} does not exist, dropping {}",
                std::any::type_name::<T>()
            );
            return false;
        }

        let id = self.register::<T>();
        let Some(storage) = self.storage_mut::<T>(id) else {
            return false;
        };
        storage.insert(entity, component);

        if let Some(record) = self.records.get_mut(&entity) {
            record.components.insert(id);
        }
        self.registry.register_component(entity, id);
        self.debug_check_entity(entity, Some(id));
        true
    }

    /// Detach and return the `T` component of `entity`
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let id = self.registry.type_id::<T>()?;
        let removed = self.storage_mut::<T>(id)?.remove(entity)?;

        if let Some(record) = self.records.get_mut(&entity) {
            record.components.remove(&id);
        }
        self.registry.unregister_component(entity, id);
        self.debug_check_entity(entity, Some(id));
        Some(removed)
    }

    /// Detach the component with type id `id`, returning whether one existed
    pub fn remove_component_by_id(&mut self, entity: Entity, id: ComponentTypeId) -> bool {
        let Some(column) = self.columns.get_mut(id.index()) else {
            return false;
        };
        if !column.remove_entity(entity) {
            return false;
        }

        if let Some(record) = self.records.get_mut(&entity) {
            record.components.remove(&id);
        }
        self.registry.unregister_component(entity, id);
        self.debug_check_entity(entity, Some(id));
        true
    }

    /// Get the `T` component of `entity`
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let id = self.registry.type_id::<T>()?;
        self.storage::<T>(id)?.get(entity)
    }

    /// Get the `T` component of `entity` mutably
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.registry.type_id::<T>()?;
        self.storage_mut::<T>(id)?.get_mut(entity)
    }

    /// Whether `entity` holds a `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .type_id::<T>()
            .is_some_and(|id| self.registry.has_component(entity, id))
    }

    /// Whether `entity` holds every type in `Q`
    ///
    /// The empty set `()` is held by every existing entity.
    pub fn has_components<Q: ComponentSet>(&self, entity: Entity) -> bool {
        if !self.records.contains_key(&entity) {
            return false;
        }
        Q::type_ids(&self.registry)
            .is_some_and(|ids| ids.iter().all(|id| self.registry.has_component(entity, *id)))
    }

    /// Type ids of every component `entity` holds
    pub fn component_types(&self, entity: Entity) -> Vec<ComponentTypeId> {
        self.records
            .get(&entity)
            .map(|record| record.components.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Active entities holding every type in `ids`, in ascending id order
    ///
    /// An empty slice matches nothing.
    pub fn query_entities(&self, ids: &[ComponentTypeId]) -> Vec<Entity> {
        if ids.is_empty() {
            return Vec::new();
        }
        self.registry
            .get_entities_with(ids)
            .into_iter()
            .filter(|entity| self.is_active(*entity))
            .collect()
    }

    /// Active entities holding every type in `Q`
    ///
    /// A type nobody has registered yet makes the result empty.
    pub fn query<Q: ComponentSet>(&self) -> Vec<Entity> {
        Q::type_ids(&self.registry).map_or_else(Vec::new, |ids| self.query_entities(&ids))
    }

    /// Iterate over every stored `T` with its owner
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.registry
            .type_id::<T>()
            .and_then(|id| self.storage::<T>(id))
            .into_iter()
            .flat_map(|storage| storage.iter())
    }

    /// Iterate mutably over every stored `T` with its owner
    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let storage = match self.registry.type_id::<T>() {
            Some(id) => self.storage_mut::<T>(id),
            None => None,
        };
        storage.into_iter().flat_map(|storage| storage.iter_mut())
    }

    /// Give `entity` a unique name, replacing its previous one
    ///
    /// If another entity holds `name` it loses it. Returns `false` if the
    /// entity does not exist.
    pub fn set_name(&mut self, entity: Entity, name: &str) -> bool {
        if !self.records.contains_key(&entity) {
            return false;
        }

        if let Some(previous) = self.names.insert(name.to_owned(), entity) {
            if previous != entity {
                log::debug!("Name '{name}' moved from {previous} to {entity}");
                if let Some(record) = self.records.get_mut(&previous) {
                    record.name = None;
                }
            }
        }

        let old = self
            .records
            .get_mut(&entity)
            .and_then(|record| record.name.replace(name.to_owned()));
        if let Some(old) = old.filter(|old| old != name) {
            self.names.remove(&old);
        }
        self.debug_check_entity(entity, None);
        true
    }

    /// Drop the name of `entity`, returning it
    pub fn clear_name(&mut self, entity: Entity) -> Option<String> {
        let name = self.records.get_mut(&entity)?.name.take()?;
        self.names.remove(&name);
        Some(name)
    }

    /// Entity currently holding `name`
    pub fn get_named(&self, name: &str) -> Option<Entity> {
        self.names.get(name).copied()
    }

    /// Name of `entity`, if it has one
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.records.get(&entity)?.name.as_deref()
    }

    /// Tag `entity`, returning `false` if it does not exist
    pub fn add_tag(&mut self, entity: Entity, tag: &str) -> bool {
        let Some(record) = self.records.get_mut(&entity) else {
            log::trace!("add_tag: {entity} does not exist, dropping '{tag}'");
            return false;
        };
        record.tags.insert(tag.to_owned());
        self.tags.entry(tag.to_owned()).or_default().insert(entity);
        self.debug_check_entity(entity, None);
        true
    }

    /// Remove a tag, returning whether `entity` had it
    pub fn remove_tag(&mut self, entity: Entity, tag: &str) -> bool {
        let removed = self
            .records
            .get_mut(&entity)
            .is_some_and(|record| record.tags.remove(tag));
        if removed {
            self.untag_index(entity, tag);
        }
        removed
    }

    /// Whether `entity` carries `tag`
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.tags.get(tag).is_some_and(|holders| holders.contains(&entity))
    }

    /// Every existing entity carrying `tag`, in ascending id order
    pub fn get_entities_with_tag(&self, tag: &str) -> Vec<Entity> {
        self.tags
            .get(tag)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Tags carried by `entity`, sorted
    pub fn tags(&self, entity: Entity) -> Vec<&str> {
        self.records
            .get(&entity)
            .map(|record| record.tags.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn untag_index(&mut self, entity: Entity, tag: &str) {
        if let Some(holders) = self.tags.get_mut(tag) {
            holders.remove(&entity);
            if holders.is_empty() {
                self.tags.remove(tag);
            }
        }
    }

    /// Remove every entity and component, keeping registered types
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.records.keys().copied().collect();
        for entity in entities {
            self.destroy_entity_immediate(entity);
        }
        self.destruction_queue.clear();
        self.pending.clear();
    }

    fn storage<T: Component>(&self, id: ComponentTypeId) -> Option<&ComponentStorage<T>> {
        self.columns
            .get(id.index())?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    fn storage_mut<T: Component>(&mut self, id: ComponentTypeId) -> Option<&mut ComponentStorage<T>> {
        self.columns
            .get_mut(id.index())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Verify that records, columns and the type index agree
    ///
    /// Returns a description of the first mismatch found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (index, column) in self.columns.iter().enumerate() {
            let id = ComponentTypeId::new(u16::try_from(index).unwrap_or(u16::MAX));
            if column.len() != self.registry.holder_count(id) {
                return Err(format!(
                    "{id} column stores {} values but the index lists {}",
                    column.len(),
                    self.registry.holder_count(id)
                ));
            }
        }

        for entity in &self.destruction_queue {
            if !self.pending.contains(entity) {
                return Err(format!("{entity} is queued but not marked pending"));
            }
        }

        for (name, entity) in &self.names {
            if self.name(*entity) != Some(name.as_str()) {
                return Err(format!("name '{name}' points at {entity} which does not carry it"));
            }
        }
        for (tag, holders) in &self.tags {
            for entity in holders {
                if !self.records.get(entity).is_some_and(|r| r.tags.contains(tag)) {
                    return Err(format!("tag '{tag}' lists {entity} which does not carry it"));
                }
            }
        }

        self.records
            .keys()
            .try_for_each(|entity| self.check_entity(*entity, None))
    }

    /// Verify one entity against the indexes, plus the column of `touched`
    fn check_entity(&self, entity: Entity, touched: Option<ComponentTypeId>) -> Result<(), String> {
        match self.records.get(&entity) {
            Some(record) => {
                for id in &record.components {
                    if !self.registry.has_component(entity, *id) {
                        return Err(format!("{entity} holds {id} but the index does not list it"));
                    }
                    if !self.columns.get(id.index()).is_some_and(|c| c.contains(entity)) {
                        return Err(format!("{entity} holds {id} but its column has no value"));
                    }
                }
                if let Some(name) = &record.name {
                    if self.names.get(name) != Some(&entity) {
                        return Err(format!("{entity} is named '{name}' but the name index disagrees"));
                    }
                }
                if let Some(tag) = record.tags.iter().find(|tag| !self.has_tag(entity, tag)) {
                    return Err(format!("{entity} carries '{tag}' but the tag index does not list it"));
                }
            }
            None => {
                let ghost = (0..self.registry.type_count())
                    .filter_map(|index| u16::try_from(index).ok())
                    .map(ComponentTypeId::new)
                    .find(|id| self.registry.has_component(entity, *id));
                if let Some(id) = ghost {
                    return Err(format!("{entity} was removed but the index still lists it under {id}"));
                }
                if self.pending.contains(&entity) {
                    return Err(format!("{entity} was removed but is still pending"));
                }
                if self.names.values().any(|holder| *holder == entity) {
                    return Err(format!("{entity} was removed but still owns a name"));
                }
                if self.tags.values().any(|holders| holders.contains(&entity)) {
                    return Err(format!("{entity} was removed but is still tagged"));
                }
            }
        }

        if let Some(id) = touched {
            let holds = self.records.get(&entity).is_some_and(|r| r.components.contains(&id));
            if self.registry.has_component(entity, id) != holds {
                return Err(format!("{entity} and the index disagree about {id}"));
            }
            let stored = self.columns.get(id.index()).map_or(0, |c| c.len());
            if stored != self.registry.holder_count(id) {
                return Err(format!(
                    "{id} column stores {stored} values but the index lists {}",
                    self.registry.holder_count(id)
                ));
            }
        }
        Ok(())
    }

    /// Debug-build check of the entity a mutation just touched
    ///
    /// Scoped to one entity and one column so bulk spawning stays linear.
    fn debug_check_entity(&self, entity: Entity, touched: Option<ComponentTypeId>) {
        #[cfg(debug_assertions)]
        {
            let state = self.check_entity(entity, touched);
            debug_assert!(state.is_ok(), "entity manager out of sync: {state:?}");
        }
        #[cfg(not(debug_assertions))]
        let _ = (entity, touched);
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, Transform, Velocity};

    #[test]
    fn test_create_entities_have_unique_ids() {
        let mut manager = EntityManager::new();
        let a = manager.create_entity();
        let b = manager.create_entity();

        assert_ne!(a, b);
        assert_eq!(manager.entity_count(), 2);
        assert!(manager.is_alive(a));
        assert!(manager.is_active(b));
    }

    #[test]
    fn test_explicit_id_is_skipped_by_auto_ids() {
        let mut manager = EntityManager::new();
        let explicit = manager.create_entity_with_id(Entity::from_raw(3));
        let ids: Vec<Entity> = (0..5).map(|_| manager.create_entity()).collect();

        assert!(!ids.contains(&explicit));
        assert_eq!(manager.entity_count(), 6);
    }

    #[test]
    fn test_duplicate_explicit_id_keeps_existing() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity_with_id(Entity::from_raw(10));
        manager.add_component(entity, Transform::new(1.0, 2.0));

        let again = manager.create_entity_with_id(Entity::from_raw(10));

        assert_eq!(again, entity);
        assert_eq!(manager.entity_count(), 1);
        assert!(manager.has_component::<Transform>(entity));
    }

    #[test]
    fn test_add_replace_remove_component() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();

        assert!(manager.add_component(entity, Transform::new(1.0, 1.0)));
        assert!(manager.add_component(entity, Transform::new(5.0, 5.0)));
        assert_eq!(manager.get_component::<Transform>(entity).map(|t| t.position.x), Some(5.0));

        let removed = manager.remove_component::<Transform>(entity);
        assert!(removed.is_some());
        assert!(!manager.has_component::<Transform>(entity));
        assert!(manager.remove_component::<Transform>(entity).is_none());
        assert!(manager.check_invariants().is_ok());
    }

    #[test]
    fn test_add_component_to_unknown_entity_is_noop() {
        let mut manager = EntityManager::new();
        let ghost = Entity::from_raw(42);

        assert!(!manager.add_component(ghost, Transform::new(0.0, 0.0)));
        assert!(manager.get_component::<Transform>(ghost).is_none());
        assert!(manager.query::<(Transform,)>().is_empty());
    }

    #[test]
    fn test_query_intersection() {
        let mut manager = EntityManager::new();
        let moving = manager.create_entity();
        let still = manager.create_entity();
        let solid = manager.create_entity();

        manager.add_component(moving, Transform::new(0.0, 0.0));
        manager.add_component(moving, Velocity::new(1.0, 0.0));
        manager.add_component(still, Transform::new(0.0, 0.0));
        manager.add_component(solid, Transform::new(0.0, 0.0));
        manager.add_component(solid, Collider::circle(5.0));

        assert_eq!(manager.query::<(Transform, Velocity)>(), vec![moving]);
        assert_eq!(manager.query::<(Transform,)>(), vec![moving, still, solid]);
        assert!(manager.query::<(Velocity, Collider)>().is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Transform::new(0.0, 0.0));

        assert!(manager.query::<()>().is_empty());
        assert!(manager.query_entities(&[]).is_empty());
    }

    #[test]
    fn test_unregistered_type_query_is_empty() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Transform::new(0.0, 0.0));

        assert!(manager.query::<(Transform, Collider)>().is_empty());
    }

    #[test]
    fn test_inactive_entities_are_skipped() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Transform::new(0.0, 0.0));

        manager.set_active(entity, false);
        assert!(manager.query::<(Transform,)>().is_empty());
        assert!(manager.get_component::<Transform>(entity).is_some());

        manager.set_active(entity, true);
        assert_eq!(manager.query::<(Transform,)>(), vec![entity]);
    }

    #[test]
    fn test_deferred_destruction() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Transform::new(0.0, 0.0));
        manager.add_component(entity, Collider::circle(3.0));

        manager.destroy_entity(entity);
        manager.destroy_entity(entity);

        assert!(!manager.is_alive(entity));
        assert!(manager.exists(entity));
        assert_eq!(manager.pending_destruction_count(), 1);
        assert_eq!(manager.query::<(Transform,)>(), vec![entity]);

        assert_eq!(manager.process_destruction_queue(), 1);
        assert!(!manager.exists(entity));
        assert!(manager.query::<(Transform,)>().is_empty());
        assert!(manager.query::<(Collider,)>().is_empty());
        assert!(manager.component_types(entity).is_empty());
        assert_eq!(manager.process_destruction_queue(), 0);
    }

    #[test]
    fn test_destroy_unknown_entity_is_noop() {
        let mut manager = EntityManager::new();
        manager.destroy_entity(Entity::from_raw(99));

        assert_eq!(manager.pending_destruction_count(), 0);
        assert!(!manager.destroy_entity_immediate(Entity::from_raw(99)));
    }

    #[test]
    fn test_remove_component_by_id() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Velocity::new(2.0, 0.0));
        let id = manager.type_id::<Velocity>().unwrap();

        assert!(manager.remove_component_by_id(entity, id));
        assert!(!manager.remove_component_by_id(entity, id));
        assert!(manager.get_component::<Velocity>(entity).is_none());
    }

    #[test]
    fn test_named_entities() {
        let mut manager = EntityManager::new();
        let player = manager.create_named_entity("player");
        let decoy = manager.create_entity();

        assert_eq!(manager.get_named("player"), Some(player));
        assert_eq!(manager.name(player), Some("player"));

        assert!(manager.set_name(player, "hero"));
        assert_eq!(manager.get_named("player"), None);
        assert_eq!(manager.get_named("hero"), Some(player));

        assert!(manager.set_name(decoy, "hero"));
        assert_eq!(manager.get_named("hero"), Some(decoy));
        assert_eq!(manager.name(player), None);
        assert!(!manager.set_name(Entity::from_raw(77), "nobody"));

        manager.destroy_entity(decoy);
        manager.process_destruction_queue();
        assert_eq!(manager.get_named("hero"), None);
        assert!(manager.check_invariants().is_ok());
    }

    #[test]
    fn test_clear_name() {
        let mut manager = EntityManager::new();
        let boss = manager.create_named_entity("boss");

        assert_eq!(manager.clear_name(boss).as_deref(), Some("boss"));
        assert_eq!(manager.get_named("boss"), None);
        assert_eq!(manager.clear_name(boss), None);
    }

    #[test]
    fn test_tags_are_indexed() {
        let mut manager = EntityManager::new();
        let grunt = manager.create_entity();
        let brute = manager.create_entity();
        let rock = manager.create_entity();

        assert!(manager.add_tag(grunt, "enemy"));
        assert!(manager.add_tag(brute, "enemy"));
        assert!(manager.add_tag(brute, "boss"));
        assert!(manager.add_tag(rock, "obstacle"));
        assert!(!manager.add_tag(Entity::from_raw(50), "enemy"));

        assert_eq!(manager.get_entities_with_tag("enemy"), vec![grunt, brute]);
        assert!(manager.has_tag(brute, "boss"));
        assert_eq!(manager.tags(brute), vec!["boss", "enemy"]);

        assert!(manager.remove_tag(grunt, "enemy"));
        assert!(!manager.remove_tag(grunt, "enemy"));
        assert_eq!(manager.get_entities_with_tag("enemy"), vec![brute]);

        manager.destroy_entity(brute);
        manager.process_destruction_queue();
        assert!(manager.get_entities_with_tag("enemy").is_empty());
        assert!(manager.get_entities_with_tag("boss").is_empty());
        assert!(!manager.has_tag(brute, "boss"));
        assert!(manager.check_invariants().is_ok());
    }

    #[test]
    fn test_has_components() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Transform::new(0.0, 0.0));
        manager.add_component(entity, Velocity::new(1.0, 0.0));

        assert!(manager.has_components::<(Transform, Velocity)>(entity));
        assert!(!manager.has_components::<(Transform, Collider)>(entity));
        assert!(manager.has_components::<()>(entity));
        assert!(!manager.has_components::<(Transform,)>(Entity::from_raw(9)));
    }

    #[test]
    fn test_bulk_spawn_keeps_indexes_consistent() {
        let mut manager = EntityManager::new();
        let entities: Vec<Entity> = (0..2000)
            .map(|i| {
                let entity = manager.create_entity();
                manager.add_component(entity, Transform::new(i as f32, 0.0));
                if i % 2 == 0 {
                    manager.add_component(entity, Velocity::new(1.0, 0.0));
                }
                entity
            })
            .collect();
        for entity in entities.iter().step_by(3) {
            manager.destroy_entity(*entity);
        }
        manager.process_destruction_queue();

        assert_eq!(manager.entity_count(), 1333);
        assert!(manager.check_invariants().is_ok());
    }

    #[test]
    fn test_iter_mut_updates_components() {
        let mut manager = EntityManager::new();
        for x in 0..3 {
            let entity = manager.create_entity();
            manager.add_component(entity, Transform::new(x as f32, 0.0));
        }

        for (_, transform) in manager.iter_mut::<Transform>() {
            transform.position.y = 7.0;
        }

        assert!(manager.iter::<Transform>().all(|(_, t)| t.position.y == 7.0));
        assert_eq!(manager.iter::<Collider>().count(), 0);
    }
}
