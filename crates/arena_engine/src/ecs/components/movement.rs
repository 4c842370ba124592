//! Movement components
//!
//! [`Velocity`] alone makes an entity drift. Adding a [`PhysicsBody`] turns on
//! friction, drag, a speed cap and bounciness for collision response.

use crate::foundation::math::{vec2, Vec2};

/// Linear and angular velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    /// World units per second
    pub linear: Vec2,
    /// Degrees per second
    pub angular: f32,
}

impl Velocity {
    /// Velocity of `(vx, vy)` with no spin
    pub fn new(vx: f32, vy: f32) -> Self {
        Self {
            linear: vec2(vx, vy),
            angular: 0.0,
        }
    }

    /// Set the spin in degrees per second
    #[must_use]
    pub fn with_angular(mut self, degrees_per_second: f32) -> Self {
        self.angular = degrees_per_second;
        self
    }

    /// Current speed
    pub fn speed(&self) -> f32 {
        self.linear.magnitude()
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Physical material of a moving entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    /// Linear velocity loss per second, as a fraction
    pub friction: f32,
    /// Fraction of velocity kept after one second
    pub drag: f32,
    /// Speed cap; zero or less disables it
    pub max_speed: f32,
    /// Restitution in `[0, 1]` used when bouncing off other colliders
    pub bounce: f32,
    /// Kinematic bodies skip friction, drag and the speed cap
    pub is_kinematic: bool,
}

impl PhysicsBody {
    /// Body with the given speed cap and default material
    pub fn with_max_speed(max_speed: f32) -> Self {
        Self {
            max_speed,
            ..Self::default()
        }
    }

    /// Set the restitution
    #[must_use]
    pub fn bouncy(mut self, bounce: f32) -> Self {
        self.bounce = bounce.clamp(0.0, 1.0);
        self
    }

    /// Set the friction coefficient
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            friction: 0.0,
            drag: 1.0,
            max_speed: 0.0,
            bounce: 0.0,
            is_kinematic: false,
        }
    }
}
