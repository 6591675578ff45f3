//! Parallel motion kernel
//!
//! A pure per-slot step executed concurrently over every active
//! projectile. Each slot reads and writes only its own state and query
//! entry, so the pass needs no locks and guarantees no ordering between
//! slots. Buffer lengths never change here; growth and removal belong to
//! the serial resolve pass.

use rayon::prelude::*;

use crate::physics::raycast::RayQuery;
use crate::sim::config::{ArchetypeConfig, MotionProfile};
use crate::sim::state::BulletData;

/// Result of stepping one slot: the next state plus the ray query
/// covering the segment the projectile swept this frame
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotStep {
    pub data: BulletData,
    pub query: RayQuery,
}

impl SlotStep {
    /// A step that produced any non-finite value is discarded and the
    /// slot keeps its pre-frame state for this tick
    fn is_finite(&self) -> bool {
        self.data.position.iter().all(|c| c.is_finite())
            && self.data.velocity.iter().all(|c| c.is_finite())
            && self.query.max_distance.is_finite()
    }
}

/// Advance one slot by `dt` at simulation time `time`.
///
/// Expired projectiles are flagged for the resolve pass and do not move.
/// Otherwise the archetype's motion profile is applied, the position
/// integrated, and the next query emitted: a ray from the previous
/// position along the (normalized) velocity, as long as this frame's
/// displacement. A stationary slot emits a zero-length query rather than
/// normalizing a zero vector.
pub(crate) fn step_slot(
    archetype: &ArchetypeConfig,
    data: &BulletData,
    mask: u32,
    time: f32,
    dt: f32,
) -> SlotStep {
    let mut next = *data;
    next.previous_position = next.position;

    if time - next.spawn_time > archetype.max_lifetime {
        next.to_be_killed = true;
        return SlotStep {
            data: next,
            query: RayQuery::zero_length(next.position, mask),
        };
    }

    match archetype.motion {
        MotionProfile::Inert => {}
        MotionProfile::Accelerated(acceleration) => next.velocity += acceleration * dt,
    }
    next.position += next.velocity * dt;

    let length = (next.position - next.previous_position).norm();
    let query = if length > 0.0 {
        RayQuery {
            origin: next.previous_position,
            direction: next.velocity.normalize(),
            max_distance: length,
            mask,
        }
    } else {
        RayQuery::zero_length(next.position, mask)
    };

    SlotStep { data: next, query }
}

/// Run the motion pass over every slot in parallel.
///
/// `state` and `queries` are index-aligned; the pass joins before
/// returning, so the caller observes a fully updated buffer pair.
pub(crate) fn run_motion_pass(
    archetypes: &[ArchetypeConfig],
    mask: u32,
    state: &mut [BulletData],
    queries: &mut [RayQuery],
    time: f32,
    dt: f32,
) {
    debug_assert_eq!(state.len(), queries.len());

    state
        .par_iter_mut()
        .zip(queries.par_iter_mut())
        .for_each(|(data, query)| {
            let archetype = &archetypes[data.archetype.index()];
            let step = step_slot(archetype, data, mask, time, dt);

            if step.is_finite() {
                *data = step.data;
                *query = step.query;
            } else {
                // Contain the fault to this slot: pre-frame state stands,
                // the update is retried next tick
                log::warn!(
                    "non-finite motion step for archetype `{}`; slot skipped this frame",
                    archetype.name
                );
                *query = RayQuery::zero_length(data.position, mask);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::collision_layers::CollisionLayers;
    use crate::sim::config::ArchetypeId;
    use approx::relative_eq;

    fn baseline() -> ArchetypeConfig {
        ArchetypeConfig {
            name: "dummy".to_string(),
            base_damage: 1.0,
            base_speed: 10.0,
            initial_pool_size: 0,
            max_lifetime: 2.0,
            motion: MotionProfile::Inert,
        }
    }

    fn flying(velocity: Vec3, spawn_time: f32) -> BulletData {
        BulletData::new(ArchetypeId::new(0), Vec3::zeros(), velocity, 1.0, spawn_time)
    }

    #[test]
    fn test_inert_integration() {
        let data = flying(Vec3::new(0.0, 0.0, 10.0), 0.0);
        let step = step_slot(&baseline(), &data, CollisionLayers::ALL, 0.1, 0.1);

        assert!(relative_eq!(
            step.data.position,
            Vec3::new(0.0, 0.0, 1.0),
            epsilon = 1.0e-6
        ));
        assert_eq!(step.data.previous_position, Vec3::zeros());
        assert!(!step.data.to_be_killed);

        // The emitted query covers exactly the swept segment
        assert_eq!(step.query.origin, Vec3::zeros());
        assert!(relative_eq!(
            step.query.direction,
            Vec3::new(0.0, 0.0, 1.0),
            epsilon = 1.0e-6
        ));
        assert!(relative_eq!(step.query.max_distance, 1.0, epsilon = 1.0e-6));
    }

    #[test]
    fn test_accelerated_profile() {
        let mut archetype = baseline();
        archetype.motion = MotionProfile::Accelerated(Vec3::new(0.0, -10.0, 0.0));

        let data = flying(Vec3::new(0.0, 0.0, 10.0), 0.0);
        let step = step_slot(&archetype, &data, CollisionLayers::ALL, 0.1, 0.1);

        assert!(relative_eq!(
            step.data.velocity,
            Vec3::new(0.0, -1.0, 10.0),
            epsilon = 1.0e-6
        ));
        assert!(relative_eq!(
            step.data.position,
            Vec3::new(0.0, -0.1, 1.0),
            epsilon = 1.0e-6
        ));
    }

    #[test]
    fn test_lifetime_expiry_flags_without_motion() {
        let data = flying(Vec3::new(0.0, 0.0, 10.0), 0.0);
        let step = step_slot(&baseline(), &data, CollisionLayers::ALL, 2.05, 0.05);

        assert!(step.data.to_be_killed);
        assert_eq!(step.data.position, Vec3::zeros(), "no motion after expiry");
        assert_eq!(step.query.max_distance, 0.0);
    }

    #[test]
    fn test_not_killed_before_lifetime() {
        let data = flying(Vec3::new(0.0, 0.0, 10.0), 0.0);
        let step = step_slot(&baseline(), &data, CollisionLayers::ALL, 1.95, 0.05);
        assert!(!step.data.to_be_killed);
    }

    #[test]
    fn test_stationary_slot_emits_zero_length_query() {
        let data = flying(Vec3::zeros(), 0.0);
        let step = step_slot(&baseline(), &data, CollisionLayers::ALL, 0.1, 0.1);

        assert_eq!(step.query.max_distance, 0.0);
        assert_eq!(step.data.position, Vec3::zeros());
    }

    #[test]
    fn test_non_finite_step_leaves_slot_untouched() {
        let archetypes = [baseline()];
        let poisoned = BulletData::new(
            ArchetypeId::new(0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, f32::NAN),
            1.0,
            0.0,
        );
        let mut state = [poisoned];
        let mut queries = [RayQuery::zero_length(poisoned.position, CollisionLayers::ALL)];

        run_motion_pass(
            &archetypes,
            CollisionLayers::ALL,
            &mut state,
            &mut queries,
            0.1,
            0.1,
        );

        assert_eq!(state[0].position, poisoned.position);
        assert_eq!(state[0].previous_position, poisoned.previous_position);
        assert_eq!(queries[0].max_distance, 0.0);
    }

    #[test]
    fn test_pass_updates_every_slot() {
        let archetypes = [baseline()];
        let mut state: Vec<BulletData> = (0..64)
            .map(|i| flying(Vec3::new(0.0, 0.0, i as f32 + 1.0), 0.0))
            .collect();
        let mut queries: Vec<RayQuery> = state
            .iter()
            .map(|d| RayQuery::zero_length(d.position, CollisionLayers::ALL))
            .collect();

        run_motion_pass(
            &archetypes,
            CollisionLayers::ALL,
            &mut state,
            &mut queries,
            0.1,
            0.1,
        );

        for (i, (data, query)) in state.iter().zip(queries.iter()).enumerate() {
            let expected = (i as f32 + 1.0) * 0.1;
            assert!(
                relative_eq!(data.position.z, expected, epsilon = 1.0e-5),
                "slot {i}"
            );
            assert!(relative_eq!(query.max_distance, expected, epsilon = 1.0e-5));
        }
    }
}
