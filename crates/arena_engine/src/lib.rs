//! # Arena Engine
//!
//! A small 2D entity-component-system substrate with a two-phase collision
//! engine, written for wave-based arena shooters.
//!
//! ## Features
//!
//! - **ECS Architecture**: entity lifecycle, per-type component indices,
//!   multi-component intersection queries and deferred destruction
//! - **Event Bus**: synchronous publish/subscribe with priorities, one-shot
//!   subscriptions and a deferred queue
//! - **Collision**: uniform-grid broad-phase, circle/AABB narrow-phase,
//!   layer/mask filtering, separation and bounce
//! - **Fixed-step loop**: bounded sub-stepping that drops surplus time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena_engine::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut game = GameLoop::new(&config);
//!
//! let ship = game.world.entities.create_entity();
//! game.world.entities.add_component(ship, Transform::new(0.0, 0.0));
//! game.world.entities.add_component(ship, Collider::circle(12.0));
//!
//! game.world.events.subscribe(
//!     |event: &CollisionEvent, _entities: &mut EntityManager, _bus: &EventBus| {
//!         log::info!("{:?} hit {:?}", event.entity_a, event.entity_b);
//!         Ok(())
//!     },
//!     0,
//!     false,
//! );
//!
//! let report = game.tick(1.0 / 60.0);
//! assert!(report.steps <= config.timing.max_steps_per_frame);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;

mod game_loop;

pub use game_loop::{FrameReport, GameLoop};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig},
        ecs::components::{Collider, ColliderShape, PhysicsBody, Transform, Velocity},
        ecs::{
            Component, ComponentTypeId, Entity, EntityManager, Schedule, System, SystemPhase,
            World,
        },
        events::{
            CollisionEvent, DamageEvent, DeathEvent, EntityDestroyedEvent, Event, EventBus,
            HandlerError, SubscriptionId,
        },
        foundation::math::Vec2,
        physics::{CollisionMask, CollisionPair, CollisionSystem, MovementSystem},
        spatial::{SpatialGrid, SpatialQuery},
        FrameReport, GameLoop,
    };
}
