//! ECS World implementation

use super::{Entity, EntityManager};
use crate::events::{EntityDestroyedEvent, Event, EventBus};
use crate::foundation::math::{clamp_vec, vec2, Vec2};

/// Rectangular play area, centred on the origin by default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl ArenaBounds {
    /// Bounds of a `width` x `height` arena centred on the origin
    pub fn centered(width: f32, height: f32) -> Self {
        let half = vec2(width * 0.5, height * 0.5);
        Self {
            min: -half,
            max: half,
        }
    }

    /// Arena width
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Arena height
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Whether `point` lies inside, edges included
    pub fn contains(&self, point: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Nearest point inside the bounds
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        clamp_vec(point, self.min, self.max)
    }
}

/// Everything a system can touch: entities, components and the event bus
pub struct World {
    /// Entities and their components
    pub entities: EntityManager,
    /// Publish/subscribe channel shared by all systems
    pub events: EventBus,
    /// Play area used for movement clamping
    pub arena: ArenaBounds,
}

impl World {
    /// Create an empty world for an arena of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            entities: EntityManager::new(),
            events: EventBus::new(),
            arena: ArenaBounds::centered(width, height),
        }
    }

    /// Resize the play area
    pub fn set_arena_size(&mut self, width: f32, height: f32) {
        self.arena = ArenaBounds::centered(width, height);
    }

    /// Create a new entity
    pub fn spawn(&mut self) -> Entity {
        self.entities.create_entity()
    }

    /// Deliver `event` now, giving handlers access to the entities
    pub fn emit<E: Event>(&mut self, event: E) -> usize {
        self.events.emit(event, &mut self.entities)
    }

    /// Deliver every event queued before this call
    pub fn flush_events(&mut self) -> usize {
        self.events.flush_events(&mut self.entities)
    }

    /// Destroy queued entities and announce each one
    ///
    /// An [`EntityDestroyedEvent`] is queued per removed entity and delivered
    /// at the next event flush.
    pub fn process_destruction_queue(&mut self) -> usize {
        let destroyed = self.entities.drain_destruction_queue();
        for &entity in &destroyed {
            self.events.emit_deferred(EntityDestroyedEvent { entity });
        }
        if !destroyed.is_empty() {
            log::debug!("Destroyed {} entities", destroyed.len());
        }
        destroyed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform;
    use crate::events::{DamageEvent, DamageKind};

    #[test]
    fn test_destruction_announces_entities() {
        let mut world = World::new(800.0, 600.0);
        let entity = world.spawn();
        world.entities.add_component(entity, Transform::new(0.0, 0.0));
        world.entities.destroy_entity(entity);

        assert_eq!(world.process_destruction_queue(), 1);
        assert_eq!(world.events.pending_events(), 1);
        assert!(!world.entities.exists(entity));
    }

    #[test]
    fn test_subscriber_applies_damage_through_world() {
        let mut world = World::new(800.0, 600.0);
        let target = world.spawn();
        world.entities.add_component(target, Transform::new(0.0, 0.0));

        world.events.subscribe(
            |event: &DamageEvent, entities: &mut EntityManager, _: &EventBus| {
                if let Some(transform) = entities.get_component_mut::<Transform>(event.target) {
                    transform.position.x += event.amount;
                }
                Ok(())
            },
            0,
            false,
        );

        let damage = DamageEvent {
            target,
            source: None,
            amount: 4.0,
            kind: DamageKind::Normal,
        };
        assert_eq!(world.emit(damage), 1);
        world.events.emit_deferred(damage);
        assert_eq!(world.flush_events(), 1);

        let x = world.entities.get_component::<Transform>(target).map(|t| t.position.x);
        assert_eq!(x, Some(8.0));
    }

    #[test]
    fn test_arena_bounds() {
        let bounds = ArenaBounds::centered(800.0, 600.0);

        assert_eq!(bounds.min, vec2(-400.0, -300.0));
        assert!(bounds.contains(vec2(400.0, 0.0)));
        assert!(!bounds.contains(vec2(401.0, 0.0)));
        assert_eq!(bounds.clamp(vec2(500.0, -350.0)), vec2(400.0, -300.0));
        assert_eq!(bounds.width(), 800.0);
    }
}
