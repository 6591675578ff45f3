//! Simulation settings and archetype descriptors
//!
//! The archetype table is supplied once at startup and is read-only
//! during simulation (only the pools' diagnostic counters change).
//! Validation is fatal: a malformed table aborts construction instead of
//! degrading into silent no-ops at fire time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::foundation::math::Vec3;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::raycast::DEFAULT_BATCH_SIZE;

/// Index of a configured projectile archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Wrap a raw archetype table index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Table index of this archetype
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How an archetype's velocity evolves while in flight
///
/// A closed, flat dispatch: the motion kernel matches on this tag per
/// slot, keeping the per-archetype branch predictable across the batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionProfile {
    /// Constant-velocity flight (the baseline)
    Inert,

    /// Constant acceleration applied before integration
    Accelerated(Vec3),
}

/// Per-archetype descriptor: one visual template, tuning values, and
/// behavior rule shared by every projectile of this kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Archetype name used for lookups and diagnostics
    pub name: String,

    /// Damage dealt on contact before multipliers
    pub base_damage: f32,

    /// Muzzle speed in units per second before multipliers
    pub base_speed: f32,

    /// Instances created up front when the pool is built
    pub initial_pool_size: u32,

    /// Seconds of flight before the projectile expires
    pub max_lifetime: f32,

    /// Velocity evolution rule evaluated by the motion kernel
    pub motion: MotionProfile,
}

/// Global simulation settings plus the archetype table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial capacity reserved for the per-slot buffers
    pub initial_capacity: usize,

    /// Collision layer mask applied to every projectile query
    pub collision_mask: u32,

    /// Queries resolved per worker batch during dispatch
    pub raycast_batch_size: usize,

    /// Pool size past which growth logs a warning (growth still succeeds)
    pub pool_soft_ceiling: u32,

    /// The archetype descriptor table, indexed by [`ArchetypeId`]
    pub archetypes: Vec<ArchetypeConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 100,
            collision_mask: CollisionLayers::mask(&[
                CollisionLayers::ENVIRONMENT,
                CollisionLayers::UNIT,
                CollisionLayers::DEBRIS,
            ]),
            raycast_batch_size: DEFAULT_BATCH_SIZE,
            pool_soft_ceiling: 1024,
            archetypes: vec![ArchetypeConfig {
                name: "dummy".to_string(),
                base_damage: 1.0,
                base_speed: 10.0,
                initial_pool_size: 0,
                max_lifetime: 2.0,
                motion: MotionProfile::Inert,
            }],
        }
    }
}

impl Config for SimulationConfig {}

/// Errors surfaced while validating or constructing a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The archetype table is empty
    #[error("no projectile archetypes configured")]
    NoArchetypes,

    /// The raycast batch size is zero
    #[error("raycast batch size must be at least 1")]
    InvalidBatchSize,

    /// An archetype descriptor is malformed
    #[error("archetype `{name}`: {reason}")]
    InvalidArchetype {
        /// Name of the offending archetype
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

impl SimulationConfig {
    /// Validate the configuration, naming the offending archetype on
    /// failure. Called by the simulation constructor; misconfiguration
    /// aborts startup.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.archetypes.is_empty() {
            return Err(SimulationError::NoArchetypes);
        }
        if self.raycast_batch_size == 0 {
            return Err(SimulationError::InvalidBatchSize);
        }

        for archetype in &self.archetypes {
            if archetype.name.is_empty() {
                return Err(SimulationError::InvalidArchetype {
                    name: "<unnamed>".to_string(),
                    reason: "archetype name must not be empty".to_string(),
                });
            }
            if !archetype.base_speed.is_finite() || archetype.base_speed <= 0.0 {
                return Err(Self::bad_archetype(archetype, "base speed must be finite and positive"));
            }
            if !archetype.base_damage.is_finite() || archetype.base_damage < 0.0 {
                return Err(Self::bad_archetype(archetype, "base damage must be finite and non-negative"));
            }
            if !archetype.max_lifetime.is_finite() || archetype.max_lifetime <= 0.0 {
                return Err(Self::bad_archetype(archetype, "max lifetime must be finite and positive"));
            }
            if let MotionProfile::Accelerated(acceleration) = archetype.motion {
                if !acceleration.iter().all(|c| c.is_finite()) {
                    return Err(Self::bad_archetype(archetype, "acceleration must be finite"));
                }
            }
        }

        Ok(())
    }

    fn bad_archetype(archetype: &ArchetypeConfig, reason: &str) -> SimulationError {
        SimulationError::InvalidArchetype {
            name: archetype.name.clone(),
            reason: reason.to_string(),
        }
    }
}
