//! Event system
//!
//! A typed, in-process publish/subscribe bus plus the gameplay event types
//! the engine itself publishes.

pub mod bus;
pub mod types;

pub use bus::{Event, EventBus, HandlerError, SubscriptionId};
pub use types::{CollisionEvent, DamageEvent, DamageKind, DeathEvent, EntityDestroyedEvent};
