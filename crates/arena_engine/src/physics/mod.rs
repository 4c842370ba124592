//! Physics module for collision detection, response and movement
//!
//! Detection is split into a grid broad-phase and exact circle/box
//! narrow-phase tests. Response separates overlapping bodies and bounces
//! approaching ones.

pub mod collision_layers;
pub mod collision_system;
pub mod movement_system;
pub mod narrow_phase;

pub use collision_layers::CollisionMask;
pub use collision_system::{CollisionPair, CollisionSystem};
pub use movement_system::MovementSystem;
pub use narrow_phase::Contact;
