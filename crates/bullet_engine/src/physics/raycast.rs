//! Batched ray-query dispatch
//!
//! Every active projectile contributes exactly one query per frame; the
//! whole query buffer is resolved in one parallel dispatch and the hits
//! are written to an index-aligned result buffer. `results[i]` always
//! corresponds to `queries[i]`; queries are never dropped or reordered.
//! The dispatch is a pure map over the collision world; results from a
//! prior frame are never reused.

use rayon::prelude::*;

use crate::foundation::math::Vec3;
use crate::physics::collision_world::CollisionWorld;
use crate::physics::primitives::RayHit;

/// Default number of queries resolved per worker batch
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// A single projectile's collision query for one frame: the ray segment
/// swept by the projectile between its previous and current position.
#[derive(Debug, Clone, Copy)]
pub struct RayQuery {
    /// Segment start (the projectile's previous position)
    pub origin: Vec3,

    /// Flight direction (normalized; zero for a stationary slot)
    pub direction: Vec3,

    /// Segment length; queries with zero length never hit
    pub max_distance: f32,

    /// Collision layer mask filtering candidate targets
    pub mask: u32,
}

impl RayQuery {
    /// Placeholder query occupying a slot without testing anything.
    ///
    /// Used for freshly fired projectiles (their first real query is
    /// emitted by the next motion pass) and for slots whose update was
    /// skipped this frame.
    pub fn zero_length(origin: Vec3, mask: u32) -> Self {
        Self {
            origin,
            direction: Vec3::zeros(),
            max_distance: 0.0,
            mask,
        }
    }
}

/// Resolve every query against the collision world, writing the nearest
/// hit (or `None`) into the result slot with the same index.
///
/// Queries are processed in parallel chunks of `batch_size`. The buffers
/// must be index-aligned; lengths are asserted in debug builds.
pub fn dispatch_batch(
    world: &CollisionWorld,
    queries: &[RayQuery],
    results: &mut [Option<RayHit>],
    batch_size: usize,
) {
    debug_assert_eq!(queries.len(), results.len());
    let batch_size = batch_size.max(1);

    queries
        .par_chunks(batch_size)
        .zip(results.par_chunks_mut(batch_size))
        .for_each(|(query_chunk, result_chunk)| {
            for (query, result) in query_chunk.iter().zip(result_chunk.iter_mut()) {
                *result = world.cast_ray(query);
            }
        });
}
