//! Typed query sets
//!
//! `EntityManager::query::<(Transform, Collider)>()` resolves each tuple
//! member to its registered id and intersects the holder sets.

use super::{Component, ComponentRegistry, ComponentTypeId};

/// A set of component types that can be queried together
pub trait ComponentSet {
    /// Ids of every member, or `None` if any member was never registered
    fn type_ids(registry: &ComponentRegistry) -> Option<Vec<ComponentTypeId>>;
}

impl ComponentSet for () {
    fn type_ids(_registry: &ComponentRegistry) -> Option<Vec<ComponentTypeId>> {
        Some(Vec::new())
    }
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn type_ids(registry: &ComponentRegistry) -> Option<Vec<ComponentTypeId>> {
                Some(vec![$(registry.type_id::<$name>()?),+])
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
