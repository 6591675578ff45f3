//! Per-slot projectile state
//!
//! Live projectiles occupy "slots": one index shared across the state,
//! instance-handle, query, and result buffers owned by the frame
//! coordinator. Everything here is plain `Copy` data so the motion kernel
//! can work on slots without touching the heap.

use crate::foundation::math::Vec3;
use crate::sim::config::ArchetypeId;

/// Simulation state for one live projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletData {
    /// Archetype this projectile was fired as (immutable)
    pub archetype: ArchetypeId,

    /// Simulation time at which it was fired (immutable)
    pub spawn_time: f32,

    /// Current world position
    pub position: Vec3,

    /// Position as of the previous frame's resolve; the origin of this
    /// frame's ray query
    pub previous_position: Vec3,

    /// Current velocity in units per second
    pub velocity: Vec3,

    /// Damage delivered on contact (immutable)
    pub damage: f32,

    /// Set by the motion kernel when the lifetime rule expires the
    /// projectile; consumed by the resolve pass
    pub to_be_killed: bool,
}

impl BulletData {
    /// State for a freshly fired projectile
    pub fn new(
        archetype: ArchetypeId,
        position: Vec3,
        velocity: Vec3,
        damage: f32,
        spawn_time: f32,
    ) -> Self {
        Self {
            archetype,
            spawn_time,
            position,
            previous_position: position,
            velocity,
            damage,
            to_be_killed: false,
        }
    }
}

/// Reference to a pooled render instance, stored at the same slot index
/// as the [`BulletData`] it animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceHandle {
    /// Pool (archetype) the instance belongs to
    pub archetype: ArchetypeId,

    /// Index of the instance within its pool
    pub index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bullet_starts_in_place() {
        let data = BulletData::new(
            ArchetypeId::new(0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, 10.0),
            5.0,
            1.5,
        );

        assert_eq!(data.previous_position, data.position);
        assert!(!data.to_be_killed);
        assert_eq!(data.spawn_time, 1.5);
        assert_eq!(data.damage, 5.0);
    }
}
