//! Collision layer flags for filtering collision detection
//!
//! Every collider sits on one or more layers and carries a mask of the layers
//! it accepts. A pair is only tested when the acceptance is mutual.

use bitflags::bitflags;

bitflags! {
    /// Collision layer bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionMask: u32 {
        /// Player ship
        const PLAYER = 1 << 0;
        /// Enemy units
        const ENEMY = 1 << 1;
        /// Shots fired by the player
        const PLAYER_PROJECTILE = 1 << 2;
        /// Shots fired by enemies
        const ENEMY_PROJECTILE = 1 << 3;
        /// Walls and other static geometry
        const OBSTACLE = 1 << 4;
        /// Collectibles
        const POWERUP = 1 << 5;
        /// Trigger volumes
        const TRIGGER = 1 << 6;

        /// Everything that physically blocks movement
        const SOLID = Self::PLAYER.bits() | Self::ENEMY.bits() | Self::OBSTACLE.bits();
        /// Every layer, including bits reserved for game code
        const ALL = u32::MAX;
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl CollisionMask {
    /// Whether two colliders should be tested against each other
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    ///
    /// ```
    /// use arena_engine::physics::CollisionMask;
    ///
    /// let player = (CollisionMask::PLAYER, CollisionMask::ENEMY | CollisionMask::OBSTACLE);
    /// let enemy = (CollisionMask::ENEMY, CollisionMask::PLAYER | CollisionMask::PLAYER_PROJECTILE);
    ///
    /// assert!(CollisionMask::should_collide(player.0, player.1, enemy.0, enemy.1));
    /// ```
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}
