//! Collision components
//!
//! A [`Collider`] gives an entity a shape for the collision system. The shape
//! is centred on the entity's `Transform` position plus `offset`.
//!
//! Filtering is two-way: a pair is tested only if each side's `mask` accepts
//! the other side's `layer`.

use crate::foundation::math::{vec2, Vec2};
use crate::physics::CollisionMask;

/// Geometric shape of a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle of the given radius
    Circle {
        /// Radius in world units
        radius: f32,
    },
    /// Axis-aligned box, never rotated
    Aabb {
        /// Full width
        width: f32,
        /// Full height
        height: f32,
    },
}

impl ColliderShape {
    /// Half side of the square the broad-phase registers
    ///
    /// For boxes this is the larger half extent, so the square always
    /// contains the box.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Self::Circle { radius } => radius,
            Self::Aabb { width, height } => width.max(height) * 0.5,
        }
    }

    /// Half width and half height
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Self::Circle { radius } => vec2(radius, radius),
            Self::Aabb { width, height } => vec2(width * 0.5, height * 0.5),
        }
    }
}

/// Collision shape, filtering and per-frame contact state
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Shape of the collider
    pub shape: ColliderShape,
    /// Offset of the shape centre from the entity position
    pub offset: Vec2,
    /// Layers this collider is on
    pub layer: CollisionMask,
    /// Layers this collider accepts
    pub mask: CollisionMask,
    /// Triggers report contacts but are never pushed apart
    pub is_trigger: bool,
    /// Static colliders are never moved by collision response
    pub is_static: bool,
    /// Set by the collision system when any contact was found this frame
    pub is_colliding: bool,
    /// Contacts found this frame
    pub collision_count: u32,
}

impl Collider {
    /// Create a collider on every layer that accepts every layer
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec2::zeros(),
            layer: CollisionMask::ALL,
            mask: CollisionMask::ALL,
            is_trigger: false,
            is_static: false,
            is_colliding: false,
            collision_count: 0,
        }
    }

    /// Circle collider
    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::Circle { radius })
    }

    /// Axis-aligned box collider
    pub fn aabb(width: f32, height: f32) -> Self {
        Self::new(ColliderShape::Aabb { width, height })
    }

    /// Set the layer and mask
    #[must_use]
    pub fn with_layers(mut self, layer: CollisionMask, mask: CollisionMask) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Shift the shape away from the entity position
    #[must_use]
    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = vec2(x, y);
        self
    }

    /// Mark this as a trigger volume
    #[must_use]
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Mark this collider as immovable
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// World-space centre of the shape for an entity at `position`
    pub fn center(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    /// Whether this collider and `other` accept each other's layers
    pub fn accepts(&self, other: &Self) -> bool {
        CollisionMask::should_collide(self.layer, self.mask, other.layer, other.mask)
    }
}
