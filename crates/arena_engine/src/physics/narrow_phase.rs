//! Exact overlap tests between collider shapes
//!
//! Every test returns a [`Contact`] whose normal points from the first shape
//! toward the second. Moving the first shape by `-normal * penetration`, or
//! the second by `+normal * penetration`, separates them.

use crate::ecs::components::ColliderShape;
use crate::foundation::math::{normalize_or, vec2, Vec2, EPSILON};

/// Overlap between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth along the normal, always positive
    pub penetration: f32,
}

/// Test two shapes centred at `center_a` and `center_b`
pub fn test_shapes(
    shape_a: &ColliderShape,
    center_a: Vec2,
    shape_b: &ColliderShape,
    center_b: Vec2,
) -> Option<Contact> {
    match (*shape_a, *shape_b) {
        (ColliderShape::Circle { radius: ra }, ColliderShape::Circle { radius: rb }) => {
            circle_circle(center_a, ra, center_b, rb)
        }
        (ColliderShape::Aabb { .. }, ColliderShape::Aabb { .. }) => aabb_aabb(
            center_a,
            shape_a.half_extents(),
            center_b,
            shape_b.half_extents(),
        ),
        (ColliderShape::Circle { radius }, ColliderShape::Aabb { .. }) => {
            circle_aabb(center_a, radius, center_b, shape_b.half_extents())
        }
        (ColliderShape::Aabb { .. }, ColliderShape::Circle { radius }) => {
            aabb_circle(center_a, shape_a.half_extents(), center_b, radius)
        }
    }
}

/// Circle against circle
///
/// Coincident centres separate along +X.
pub fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> Option<Contact> {
    let delta = center_b - center_a;
    let reach = radius_a + radius_b;
    let distance_sq = delta.magnitude_squared();
    if distance_sq >= reach * reach {
        return None;
    }

    Some(Contact {
        normal: normalize_or(delta, vec2(1.0, 0.0)),
        penetration: reach - distance_sq.sqrt(),
    })
}

/// Box against box, resolved along the axis of least overlap
///
/// Equal overlaps resolve along X. Coincident centres push toward +axis.
pub fn aabb_aabb(center_a: Vec2, half_a: Vec2, center_b: Vec2, half_b: Vec2) -> Option<Contact> {
    let delta = center_b - center_a;
    let overlap_x = half_a.x + half_b.x - delta.x.abs();
    let overlap_y = half_a.y + half_b.y - delta.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    if overlap_x <= overlap_y {
        Some(Contact {
            normal: vec2(direction(delta.x), 0.0),
            penetration: overlap_x,
        })
    } else {
        Some(Contact {
            normal: vec2(0.0, direction(delta.y)),
            penetration: overlap_y,
        })
    }
}

/// Circle against box
///
/// When the centre is outside the box the normal runs from the centre to
/// the closest point on the box. When it is inside, the circle leaves
/// through the nearest edge and the normal is the opposite of that edge's
/// outward direction.
pub fn circle_aabb(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> Option<Contact> {
    let min = box_center - half;
    let max = box_center + half;
    let closest = vec2(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
    let delta = closest - center;
    let distance_sq = delta.magnitude_squared();

    if distance_sq > EPSILON * EPSILON {
        if distance_sq >= radius * radius {
            return None;
        }
        let distance = distance_sq.sqrt();
        return Some(Contact {
            normal: delta / distance,
            penetration: radius - distance,
        });
    }

    // Centre inside the box (or on its surface); equally near edges prefer X
    let edges = [
        (center.x - min.x, vec2(1.0, 0.0)),
        (max.x - center.x, vec2(-1.0, 0.0)),
        (center.y - min.y, vec2(0.0, 1.0)),
        (max.y - center.y, vec2(0.0, -1.0)),
    ];
    let (depth, normal) = edges
        .into_iter()
        .fold(edges[0], |best, edge| if edge.0 < best.0 { edge } else { best });

    Some(Contact {
        normal,
        penetration: depth + radius,
    })
}

/// Box against circle; the mirror of [`circle_aabb`]
pub fn aabb_circle(box_center: Vec2, half: Vec2, center: Vec2, radius: f32) -> Option<Contact> {
    circle_aabb(center, radius, box_center, half).map(|contact| Contact {
        normal: -contact.normal,
        penetration: contact.penetration,
    })
}

fn direction(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}
