//! Projectile simulation
//!
//! The simulation keeps every live projectile in four index-parallel
//! buffers (per-slot state, pooled instance handles, ray queries, query
//! results) and advances them with a three-phase frame pipeline:
//! parallel motion kernel, then batched query dispatch, then the serial
//! resolve pass.
//!
//! # Module Organization
//!
//! - [`config`] - Simulation settings and the archetype descriptor table
//! - [`state`] - Per-slot projectile state and instance handles
//! - [`pool`] - Per-archetype pools of reusable render instances
//! - `kernel` - The parallel per-slot motion step (crate-internal)
//! - [`events`] - Contact notification delivery
//! - [`simulation`] - The frame coordinator owning all buffers

pub mod config;
pub mod events;
pub(crate) mod kernel;
pub mod pool;
pub mod simulation;
pub mod state;

pub use config::{ArchetypeConfig, ArchetypeId, MotionProfile, SimulationConfig, SimulationError};
pub use events::{ContactEvent, ContactHandler};
pub use pool::{InstancePool, RenderInstance};
pub use simulation::BulletSimulation;
pub use state::{BulletData, InstanceHandle};
