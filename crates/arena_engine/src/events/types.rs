//! Gameplay events published by the engine and by game code

use super::Event;
use crate::ecs::Entity;
use crate::foundation::math::{vec2, Vec2};

/// Two colliders were found overlapping this step
///
/// The normal points from `entity_a` toward `entity_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// First entity of the pair
    pub entity_a: Entity,
    /// Second entity of the pair
    pub entity_b: Entity,
    /// Contact normal, x component
    pub normal_x: f32,
    /// Contact normal, y component
    pub normal_y: f32,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl CollisionEvent {
    /// Contact normal as a vector
    pub fn normal(&self) -> Vec2 {
        vec2(self.normal_x, self.normal_y)
    }

    /// Whether `entity` is one side of the pair
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// The other side of the pair, if `entity` is one of them
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if entity == self.entity_a {
            Some(self.entity_b)
        } else if entity == self.entity_b {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

impl Event for CollisionEvent {}

/// Kind of damage, for resistances and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamageKind {
    /// Plain hit
    #[default]
    Normal,
    /// Body contact
    Contact,
    /// Projectile hit
    Projectile,
    /// Area damage
    Explosion,
}

/// Damage was dealt to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    /// Entity taking damage
    pub target: Entity,
    /// Entity dealing damage, if any
    pub source: Option<Entity>,
    /// Amount of damage
    pub amount: f32,
    /// Kind of damage
    pub kind: DamageKind,
}

impl Event for DamageEvent {}

/// An entity ran out of health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
    /// Entity credited with the kill
    pub killer: Option<Entity>,
}

impl Event for DeathEvent {}

/// An entity was removed by the destruction flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDestroyedEvent {
    /// The removed entity; its id is no longer valid
    pub entity: Entity,
}

impl Event for EntityDestroyedEvent {}
