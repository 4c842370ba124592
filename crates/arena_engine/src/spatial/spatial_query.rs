//! Abstract spatial query interface for broad-phase collision detection
//!
//! The collision system only talks to this trait, so the partitioning scheme
//! can be swapped without touching it.

use crate::ecs::Entity;
use crate::foundation::math::Vec2;
use std::any::Any;

/// Spatial partitioning used by the broad-phase
pub trait SpatialQuery: Send + Sync {
    /// Insert an entity whose bounding square is `position` +/- `radius`
    ///
    /// Inserting an entity already present replaces its old placement.
    fn insert(&mut self, entity: Entity, position: Vec2, radius: f32);

    /// Remove an entity
    fn remove(&mut self, entity: Entity);

    /// Move an entity
    fn update(&mut self, entity: Entity, position: Vec2, radius: f32) {
        self.insert(entity, position, radius);
    }

    /// Entities sharing at least one cell with `entity`, excluding itself
    ///
    /// The result is a candidate set in ascending id order; an entity that
    /// was never inserted has no candidates.
    fn query_nearby(&self, entity: Entity) -> Vec<Entity>;

    /// Entities whose bounding square overlaps the rectangle `[min, max]`
    fn query_region(&self, min: Vec2, max: Vec2) -> Vec<Entity>;

    /// Entities whose bounding circle overlaps the given circle
    fn query_radius(&self, center: Vec2, radius: f32) -> Vec<Entity>;

    /// Position and radius an entity was inserted with
    fn get_entity_data(&self, entity: Entity) -> Option<(Vec2, f32)>;

    /// Resize the covered area; this also empties the structure
    fn resize(&mut self, width: f32, height: f32);

    /// Remove every entity
    fn clear(&mut self);

    /// Number of inserted entities
    fn entity_count(&self) -> usize;

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
