//! Collision detection and response system
//!
//! Each step runs in two phases:
//! 1. Broad-phase: every entity with a `Transform` and a `Collider` is
//!    inserted into the spatial structure, and entities sharing a cell become
//!    candidate pairs.
//! 2. Narrow-phase: each candidate pair is tested once for exact overlap.
//!
//! Confirmed pairs are recorded, announced with a [`CollisionEvent`] and,
//! unless either side is a trigger, pushed apart. Handlers run synchronously
//! while the step is in progress, so later pairs see any changes they make.

use crate::ecs::components::{Collider, PhysicsBody, Transform, Velocity};
use crate::ecs::{Entity, EntityManager, System, SystemPhase, World};
use crate::events::{CollisionEvent, EventBus};
use crate::foundation::math::Vec2;
use crate::physics::narrow_phase::{self, Contact};
use crate::spatial::{SpatialGrid, SpatialQuery};
use std::any::Any;
use std::collections::HashSet;

/// A confirmed contact between two entities this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    /// Lower-id entity of the pair
    pub entity_a: Entity,
    /// Higher-id entity of the pair
    pub entity_b: Entity,
    /// Unit normal from `entity_a` toward `entity_b`
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl CollisionPair {
    fn new(entity_a: Entity, entity_b: Entity, contact: Contact) -> Self {
        Self {
            entity_a,
            entity_b,
            normal: contact.normal,
            penetration: contact.penetration,
        }
    }

    /// Whether `entity` is one side of the pair
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

impl From<CollisionPair> for CollisionEvent {
    fn from(pair: CollisionPair) -> Self {
        Self {
            entity_a: pair.entity_a,
            entity_b: pair.entity_b,
            normal_x: pair.normal.x,
            normal_y: pair.normal.y,
            penetration: pair.penetration,
        }
    }
}

/// Detects overlapping colliders and separates them
pub struct CollisionSystem {
    spatial_query: Box<dyn SpatialQuery>,
    pairs: Vec<CollisionPair>,
}

impl CollisionSystem {
    /// Collision system with a uniform grid over a centred arena
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        Self::with_spatial_query(Box::new(SpatialGrid::new(width, height, cell_size)))
    }

    /// Collision system over any broad-phase structure
    pub fn with_spatial_query(spatial_query: Box<dyn SpatialQuery>) -> Self {
        Self {
            spatial_query,
            pairs: Vec::new(),
        }
    }

    /// Resize the broad-phase to a new arena
    pub fn set_arena_size(&mut self, width: f32, height: f32) {
        self.spatial_query.resize(width, height);
    }

    /// The broad-phase structure, as filled by the last step
    pub fn spatial_query(&self) -> &dyn SpatialQuery {
        self.spatial_query.as_ref()
    }

    /// The broad-phase as a grid, if it is one
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.spatial_query.as_any().downcast_ref::<SpatialGrid>()
    }

    /// Pairs confirmed during the last step, in detection order
    pub fn current_collisions(&self) -> &[CollisionPair] {
        &self.pairs
    }

    /// Number of pairs confirmed during the last step
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs from the last step that involve `entity`
    pub fn get_collisions_for(&self, entity: Entity) -> Vec<CollisionPair> {
        self.pairs
            .iter()
            .filter(|pair| pair.involves(entity))
            .copied()
            .collect()
    }

    /// Whether `entity` was part of any pair during the last step
    pub fn is_colliding(&self, entity: Entity) -> bool {
        self.pairs.iter().any(|pair| pair.involves(entity))
    }

    /// Run detection and response over `entities`, announcing contacts on `events`
    pub fn detect_and_resolve(&mut self, entities: &mut EntityManager, events: &EventBus) {
        self.pairs.clear();
        for (_, collider) in entities.iter_mut::<Collider>() {
            collider.is_colliding = false;
            collider.collision_count = 0;
        }

        let bodies = self.rebuild_broad_phase(entities);

        let mut tested: HashSet<(Entity, Entity)> = HashSet::new();
        for &entity in &bodies {
            for other in self.spatial_query.query_nearby(entity) {
                let key = if entity < other { (entity, other) } else { (other, entity) };
                if !tested.insert(key) {
                    continue;
                }
                self.test_pair(entities, events, key.0, key.1);
            }
        }

        log::trace!(
            "Collision step: {} bodies, {} candidate pairs, {} contacts",
            bodies.len(),
            tested.len(),
            self.pairs.len()
        );
    }

    fn rebuild_broad_phase(&mut self, entities: &EntityManager) -> Vec<Entity> {
        self.spatial_query.clear();
        let bodies = entities.query::<(Transform, Collider)>();
        for &entity in &bodies {
            if let (Some(transform), Some(collider)) = (
                entities.get_component::<Transform>(entity),
                entities.get_component::<Collider>(entity),
            ) {
                self.spatial_query.insert(
                    entity,
                    collider.center(transform.position),
                    collider.shape.bounding_radius(),
                );
            }
        }
        bodies
    }

    fn test_pair(&mut self, entities: &mut EntityManager, events: &EventBus, a: Entity, b: Entity) {
        // Read current state; an earlier handler may have moved or stripped either side
        let (Some(collider_a), Some(collider_b)) = (
            entities.get_component::<Collider>(a).cloned(),
            entities.get_component::<Collider>(b).cloned(),
        ) else {
            return;
        };
        let (Some(position_a), Some(position_b)) = (
            entities.get_component::<Transform>(a).map(|t| t.position),
            entities.get_component::<Transform>(b).map(|t| t.position),
        ) else {
            return;
        };

        if !collider_a.accepts(&collider_b) {
            return;
        }

        let Some(contact) = narrow_phase::test_shapes(
            &collider_a.shape,
            collider_a.center(position_a),
            &collider_b.shape,
            collider_b.center(position_b),
        ) else {
            return;
        };

        let pair = CollisionPair::new(a, b, contact);
        self.pairs.push(pair);
        for entity in [a, b] {
            if let Some(collider) = entities.get_component_mut::<Collider>(entity) {
                collider.is_colliding = true;
                collider.collision_count += 1;
            }
        }

        events.emit(CollisionEvent::from(pair), entities);

        if !collider_a.is_trigger && !collider_b.is_trigger {
            resolve(entities, &pair, collider_a.is_static, collider_b.is_static);
        }
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn phase(&self) -> SystemPhase {
        SystemPhase::Collision
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let World {
            entities, events, ..
        } = world;
        self.detect_and_resolve(entities, events);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Push the pair apart and bounce approaching bodies
///
/// Static colliders never move. A single dynamic side takes the whole
/// correction; two dynamic sides split it evenly.
fn resolve(entities: &mut EntityManager, pair: &CollisionPair, static_a: bool, static_b: bool) {
    let correction = pair.normal * pair.penetration;
    let (share_a, share_b) = match (static_a, static_b) {
        (true, true) => return,
        (false, true) => (1.0, 0.0),
        (true, false) => (0.0, 1.0),
        (false, false) => (0.5, 0.5),
    };

    if let Some(transform) = entities.get_component_mut::<Transform>(pair.entity_a) {
        transform.position -= correction * share_a;
    }
    if let Some(transform) = entities.get_component_mut::<Transform>(pair.entity_b) {
        transform.position += correction * share_b;
    }

    let restitution = (bounciness(entities, pair.entity_a) + bounciness(entities, pair.entity_b)) * 0.5;
    if !static_a {
        if let Some(velocity) = entities.get_component_mut::<Velocity>(pair.entity_a) {
            let approach = velocity.linear.dot(&pair.normal);
            if approach > 0.0 {
                velocity.linear -= pair.normal * (approach * (1.0 + restitution));
            }
        }
    }
    if !static_b {
        if let Some(velocity) = entities.get_component_mut::<Velocity>(pair.entity_b) {
            let approach = velocity.linear.dot(&pair.normal);
            if approach < 0.0 {
                velocity.linear -= pair.normal * (approach * (1.0 + restitution));
            }
        }
    }
}

fn bounciness(entities: &EntityManager, entity: Entity) -> f32 {
    entities
        .get_component::<PhysicsBody>(entity)
        .map_or(0.0, |body| body.bounce)
}
