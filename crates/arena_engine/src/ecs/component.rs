//! Component trait and type identifiers

use std::fmt;

/// Marker trait for components
///
/// Any plain data type can be a component. Each entity holds at most one
/// instance of a given component type.
pub trait Component: 'static + Send + Sync {}

/// Small integer id assigned to a component type when it is first registered
///
/// Ids are dense and stable for the lifetime of an
/// [`EntityManager`](super::EntityManager), so they can index storage
/// columns directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(u16);

impl ComponentTypeId {
    pub(crate) const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Index into per-type tables
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType#{}", self.0)
    }
}

// Core components
impl Component for super::components::Transform {}
impl Component for super::components::Velocity {}
impl Component for super::components::PhysicsBody {}
impl Component for super::components::Collider {}
