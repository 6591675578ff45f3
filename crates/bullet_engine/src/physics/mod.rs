//! Physics module for ray-based collision queries
//!
//! Provides the geometric primitives, layer filtering, collider registry,
//! and batched ray-query dispatch used by the projectile simulation.
//! Queries are one-directional (ray versus registered collider) and are
//! resolved fresh every frame; nothing in this module carries state across
//! frames besides the collider registry itself.

pub mod collision_layers;
pub mod collision_world;
pub mod primitives;
pub mod raycast;

pub use collision_layers::CollisionLayers;
pub use collision_world::{Collider, ColliderKey, CollisionWorld, SurfaceKind};
pub use primitives::{BoundingSphere, Ray, RayHit};
pub use raycast::{dispatch_batch, RayQuery, DEFAULT_BATCH_SIZE};
