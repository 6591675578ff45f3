//! # Bullet Engine
//!
//! A pooled, data-parallel projectile simulation core.
//!
//! The engine simulates large, dynamically sized swarms of short-lived
//! projectiles without per-frame heap allocation: instances are recycled
//! through per-archetype object pools, per-slot state lives in contiguous
//! index-parallel buffers, motion is integrated by a parallel kernel, and
//! collisions are resolved through a single batched ray-query dispatch
//! each frame.
//!
//! ## Frame pipeline
//!
//! Each [`sim::BulletSimulation::update`] call runs three phases in a
//! fixed order:
//!
//! 1. **Parallel motion pass**: a pure per-slot kernel integrates
//!    velocity, applies the archetype's lifetime rule, and emits the ray
//!    query for this frame's flight segment.
//! 2. **Batched query dispatch**: all queries are resolved against the
//!    [`physics::CollisionWorld`] in parallel chunks, producing an
//!    index-aligned result buffer.
//! 3. **Serial resolve pass**: expired and colliding slots are removed
//!    via swap-back compaction, their instances returned to the pool, and
//!    contact events delivered.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bullet_engine::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let config = SimulationConfig::default();
//!     let mut sim = BulletSimulation::new(config)?;
//!
//!     let mut world = CollisionWorld::new();
//!     world.add_collider(
//!         BoundingSphere::new(Vec3::new(0.0, 0.0, 20.0), 2.0),
//!         CollisionLayers::ENVIRONMENT,
//!         Some(SurfaceKind::Concrete),
//!     );
//!
//!     let dummy = sim.archetype_id("dummy").unwrap();
//!     sim.fire(dummy, Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
//!
//!     for _ in 0..120 {
//!         sim.update(&world, 1.0 / 60.0);
//!     }
//!
//!     sim.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod sim;

/// Common imports for engine users
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::foundation::{
        math::{Quat, Transform, Vec3},
        time::Timer,
    };
    pub use crate::physics::{
        BoundingSphere, ColliderKey, CollisionLayers, CollisionWorld, Ray, RayHit, RayQuery,
        SurfaceKind,
    };
    pub use crate::sim::{
        ArchetypeConfig, ArchetypeId, BulletSimulation, ContactEvent, ContactHandler,
        InstanceHandle, MotionProfile, SimulationConfig, SimulationError,
    };
}
