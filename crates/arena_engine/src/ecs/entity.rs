//! Entity implementation

use std::fmt;

/// Entity identifier
///
/// Entities are plain ids; all state lives in components owned by the
/// [`EntityManager`](super::EntityManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Create an entity handle from a raw id
    ///
    /// The handle refers to a live entity only if the manager created it.
    pub const fn from_raw(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}
