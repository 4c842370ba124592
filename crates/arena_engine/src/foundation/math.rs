//! Math utilities and types
//!
//! Provides the 2D vector type used by components, the spatial grid and the
//! narrow-phase tests.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Distances below this are treated as degenerate (coincident centres)
pub const EPSILON: f32 = 1e-6;

/// Build a vector from components
#[inline]
#[must_use]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// Normalize `v`, or return `fallback` when its length is near zero
#[must_use]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let length = v.magnitude();
    if length < EPSILON {
        fallback
    } else {
        v / length
    }
}

/// Wrap an angle in degrees into the half-open range (-180, 180]
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Clamp every component of `v` into `[min, max]`
#[must_use]
pub fn clamp_vec(v: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(v.x.clamp(min.x, max.x), v.y.clamp(min.y, max.y))
}
