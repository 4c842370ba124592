//! Entity Component System (ECS) implementation
//!
//! Entities are ids, components are plain data stored per type, and systems
//! run over the entities that hold the components they need.

pub mod component;
pub mod components;
pub mod entity;
pub mod entity_manager;
pub mod query;
pub mod registry;
pub mod storage;
pub mod system;
pub mod world;

pub use component::{Component, ComponentTypeId};
pub use entity::Entity;
pub use entity_manager::EntityManager;
pub use query::ComponentSet;
pub use registry::ComponentRegistry;
pub use storage::{ComponentKey, ComponentStorage};
pub use system::{Schedule, System, SystemPhase};
pub use world::{ArenaBounds, World};
