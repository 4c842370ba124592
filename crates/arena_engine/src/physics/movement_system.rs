//! Velocity integration
//!
//! Moves every entity that has both a `Transform` and a `Velocity`. A
//! `PhysicsBody`, when present, adds friction, drag and a speed cap.
//! Positions are kept inside the arena; hitting an edge zeroes the velocity
//! component pointing out of it.

use crate::ecs::components::{PhysicsBody, Transform, Velocity};
use crate::ecs::{ArenaBounds, System, SystemPhase, World};
use crate::foundation::math::wrap_degrees;
use std::any::Any;

/// Integrates velocities into transforms
#[derive(Debug, Clone)]
pub struct MovementSystem {
    confine_to_arena: bool,
}

impl MovementSystem {
    /// Movement system that keeps entities inside the arena
    pub fn new() -> Self {
        Self {
            confine_to_arena: true,
        }
    }

    /// Movement system that lets entities leave the arena
    pub fn unconfined() -> Self {
        Self {
            confine_to_arena: false,
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn phase(&self) -> SystemPhase {
        SystemPhase::Physics
    }

    fn update(&mut self, world: &mut World, delta_time: f32) {
        let arena = self.confine_to_arena.then_some(world.arena);
        let entities = &mut world.entities;

        for entity in entities.query::<(Transform, Velocity)>() {
            let body = entities.get_component::<PhysicsBody>(entity).copied();
            let Some(mut velocity) = entities.get_component::<Velocity>(entity).copied() else {
                continue;
            };

            if let Some(body) = body.filter(|body| !body.is_kinematic) {
                apply_material(&mut velocity, &body, delta_time);
            }

            let Some(transform) = entities.get_component_mut::<Transform>(entity) else {
                continue;
            };
            transform.position += velocity.linear * delta_time;
            transform.angle = wrap_degrees(transform.angle + velocity.angular * delta_time);
            if let Some(arena) = arena {
                confine(transform, &mut velocity, &arena);
            }

            if let Some(stored) = entities.get_component_mut::<Velocity>(entity) {
                *stored = velocity;
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn apply_material(velocity: &mut Velocity, body: &PhysicsBody, delta_time: f32) {
    velocity.linear *= (1.0 - body.friction * delta_time).max(0.0);
    if body.drag < 1.0 {
        velocity.linear *= body.drag.max(0.0).powf(delta_time);
    }
    if body.max_speed > 0.0 {
        let speed = velocity.speed();
        if speed > body.max_speed {
            velocity.linear *= body.max_speed / speed;
        }
    }
}

fn confine(transform: &mut Transform, velocity: &mut Velocity, arena: &ArenaBounds) {
    let clamped = arena.clamp(transform.position);
    if clamped.x != transform.position.x {
        velocity.linear.x = 0.0;
    }
    if clamped.y != transform.position.y {
        velocity.linear.y = 0.0;
    }
    transform.position = clamped;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::foundation::math::vec2;
    use approx::assert_relative_eq;

    fn mover(world: &mut World, velocity: Velocity) -> Entity {
        let entity = world.entities.create_entity();
        world.entities.add_component(entity, Transform::new(0.0, 0.0));
        world.entities.add_component(entity, velocity);
        entity
    }

    #[test]
    fn test_integrates_position_and_angle() {
        let mut world = World::new(800.0, 600.0);
        let entity = mover(&mut world, Velocity::new(10.0, -20.0).with_angular(400.0));

        MovementSystem::new().update(&mut world, 0.5);

        let transform = world.entities.get_component::<Transform>(entity).unwrap();
        assert_relative_eq!(transform.position.x, 5.0);
        assert_relative_eq!(transform.position.y, -10.0);
        assert_relative_eq!(transform.angle, -160.0);
    }

    #[test]
    fn test_friction_and_speed_cap() {
        let mut world = World::new(800.0, 600.0);
        let entity = mover(&mut world, Velocity::new(100.0, 0.0));
        world
            .entities
            .add_component(entity, PhysicsBody::with_max_speed(40.0).with_friction(0.5));

        MovementSystem::new().update(&mut world, 1.0);

        let velocity = world.entities.get_component::<Velocity>(entity).unwrap();
        assert_relative_eq!(velocity.linear.x, 40.0);
    }

    #[test]
    fn test_kinematic_body_skips_material() {
        let mut world = World::new(800.0, 600.0);
        let entity = mover(&mut world, Velocity::new(100.0, 0.0));
        let body = PhysicsBody {
            is_kinematic: true,
            ..PhysicsBody::with_max_speed(10.0)
        };
        world.entities.add_component(entity, body);

        MovementSystem::new().update(&mut world, 0.1);

        let velocity = world.entities.get_component::<Velocity>(entity).unwrap();
        assert_relative_eq!(velocity.linear.x, 100.0);
    }

    #[test]
    fn test_arena_edge_stops_outward_motion() {
        let mut world = World::new(100.0, 100.0);
        let entity = mover(&mut world, Velocity::new(200.0, 10.0));

        MovementSystem::new().update(&mut world, 1.0);

        let transform = world.entities.get_component::<Transform>(entity).unwrap();
        assert_eq!(transform.position, vec2(50.0, 10.0));
        let velocity = world.entities.get_component::<Velocity>(entity).unwrap();
        assert_eq!(velocity.linear, vec2(0.0, 10.0));
    }

    #[test]
    fn test_unconfined_leaves_arena() {
        let mut world = World::new(100.0, 100.0);
        let entity = mover(&mut world, Velocity::new(200.0, 0.0));

        MovementSystem::unconfined().update(&mut world, 1.0);

        let transform = world.entities.get_component::<Transform>(entity).unwrap();
        assert_relative_eq!(transform.position.x, 200.0);
    }
}
