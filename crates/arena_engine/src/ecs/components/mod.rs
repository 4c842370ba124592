//! Core components shared by the built-in systems

pub mod collision;
pub mod movement;
pub mod transform;

pub use collision::{Collider, ColliderShape};
pub use movement::{PhysicsBody, Velocity};
pub use transform::Transform;
