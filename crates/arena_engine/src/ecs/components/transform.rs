//! 2D placement of an entity

use crate::foundation::math::{vec2, wrap_degrees, Vec2};

/// Position and heading in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position
    pub position: Vec2,
    /// Heading in degrees, kept in (-180, 180] by the movement system
    pub angle: f32,
}

impl Transform {
    /// Transform at `(x, y)` facing angle zero
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: vec2(x, y),
            angle: 0.0,
        }
    }

    /// Set the heading in degrees
    #[must_use]
    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = wrap_degrees(degrees);
        self
    }

    /// Unit vector the entity is facing
    pub fn forward(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        vec2(radians.cos(), radians.sin())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
