//! End-to-end frame pipeline tests
//!
//! These drive the public surface the way an embedding game would: build
//! a config, register targets, fire, and step whole frames.

use std::cell::RefCell;
use std::rc::Rc;

use approx::relative_eq;
use bullet_engine::prelude::*;
use rand::Rng;

const DT: f32 = 0.1;

fn forward() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

fn new_simulation() -> (BulletSimulation, ArchetypeId) {
    let sim = BulletSimulation::new(SimulationConfig::default()).unwrap();
    let dummy = sim.archetype_id("dummy").unwrap();
    (sim, dummy)
}

/// Install a contact handler that records every event it sees
fn install_recorder(sim: &mut BulletSimulation) -> Rc<RefCell<Vec<ContactEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    sim.set_contact_handler(Box::new(move |event: &ContactEvent| {
        sink.borrow_mut().push(*event);
    }));
    events
}

#[test]
fn buffers_stay_aligned_across_frames() {
    let (mut sim, dummy) = new_simulation();
    let world = CollisionWorld::new();

    for i in 0..8 {
        sim.fire(dummy, Vec3::new(i as f32, 0.0, 0.0), forward());
    }
    let [a, b, c, d] = sim.buffer_lengths();
    assert!(a == 8 && b == 8 && c == 8 && d == 8);

    for _ in 0..30 {
        sim.update(&world, DT);
        let lengths = sim.buffer_lengths();
        assert!(lengths.iter().all(|&l| l == lengths[0]), "{lengths:?}");
        assert_eq!(sim.active_count() as usize, lengths[0]);
    }
}

#[test]
fn scenario_straight_flight_one_frame() {
    let (mut sim, dummy) = new_simulation();
    let world = CollisionWorld::new();

    sim.fire(dummy, Vec3::zeros(), forward());
    sim.update(&world, DT);

    let slot = &sim.slots()[0];
    assert_eq!(slot.velocity, Vec3::new(0.0, 0.0, 10.0));
    assert!(relative_eq!(slot.position, Vec3::new(0.0, 0.0, 1.0), epsilon = 1.0e-6));
    assert_eq!(slot.previous_position, Vec3::zeros());
}

#[test]
fn empty_pool_grows_to_match_volley() {
    let (mut sim, dummy) = new_simulation();
    assert_eq!(sim.pool(dummy).size(), 0);

    for _ in 0..5 {
        sim.fire(dummy, Vec3::zeros(), forward());
    }

    assert_eq!(sim.pool(dummy).size(), 5);
    assert_eq!(sim.active_count(), 5);
    assert_eq!(sim.pool(dummy).active(), 5);
}

#[test]
fn fire_reuses_before_growing() {
    let (mut sim, dummy) = new_simulation();
    let world = CollisionWorld::new();

    sim.fire(dummy, Vec3::zeros(), forward());
    assert_eq!(sim.pool(dummy).size(), 1);

    // Let the projectile expire so its instance returns to the pool
    for _ in 0..25 {
        sim.update(&world, DT);
    }
    assert_eq!(sim.active_count(), 0);
    assert_eq!(sim.pool(dummy).available(), 1);

    sim.fire(dummy, Vec3::zeros(), forward());
    assert_eq!(sim.pool(dummy).size(), 1, "reuse must not grow the pool");
    assert_eq!(sim.active_count(), 1);
}

#[test]
fn baseline_lifetime_kill_window() {
    let (mut sim, dummy) = new_simulation();
    let world = CollisionWorld::new();

    sim.fire(dummy, Vec3::zeros(), forward());

    // Well inside the 2 second lifetime: must be alive
    for _ in 0..19 {
        sim.update(&world, DT);
    }
    assert_eq!(sim.active_count(), 1, "killed too early");

    // Within one frame past the lifetime: must be gone
    for _ in 0..3 {
        sim.update(&world, DT);
    }
    assert_eq!(sim.active_count(), 0, "survived past its lifetime");
}

#[test]
fn expiry_emits_non_impact_contact() {
    let (mut sim, dummy) = new_simulation();
    let world = CollisionWorld::new();
    let events = install_recorder(&mut sim);

    sim.fire(dummy, Vec3::zeros(), forward());
    for _ in 0..25 {
        sim.update(&world, DT);
    }

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert!(!events[0].is_impact());
    assert!(events[0].target.is_none());
    assert!(events[0].surface.is_none());
}

#[test]
fn hit_removes_slot_same_frame_and_snaps_to_hit_point() {
    let (mut sim, dummy) = new_simulation();
    let events = install_recorder(&mut sim);

    // Sphere surface at z=1.5: out of reach of the first frame's swept
    // segment (0 -> 1.0), struck by the second (1.0 -> 2.0)
    let mut world = CollisionWorld::new();
    let wall = world.add_collider(
        BoundingSphere::new(Vec3::new(0.0, 0.0, 2.5), 1.0),
        CollisionLayers::ENVIRONMENT,
        Some(SurfaceKind::Concrete),
    );

    sim.fire(dummy, Vec3::zeros(), forward());

    sim.update(&world, DT);
    assert_eq!(sim.active_count(), 1);

    sim.update(&world, DT);
    assert_eq!(sim.active_count(), 0, "hit must remove the slot this frame");

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.target, Some(wall));
    assert_eq!(event.surface, Some(SurfaceKind::Concrete));
    assert!(relative_eq!(event.position, Vec3::new(0.0, 0.0, 1.5), epsilon = 1.0e-4));

    // The instance was parked exactly at the hit point and is reusable
    let instance = sim.pool(dummy).instance(0);
    assert!(!instance.visible);
    assert!(relative_eq!(
        instance.transform.position,
        Vec3::new(0.0, 0.0, 1.5),
        epsilon = 1.0e-4
    ));

    sim.fire(dummy, Vec3::zeros(), forward());
    assert_eq!(sim.pool(dummy).size(), 1, "struck instance must be reused");
}

#[test]
fn swap_back_removal_preserves_survivors() {
    let (mut sim, dummy) = new_simulation();

    // A wall only the middle projectile can reach this frame
    let mut world = CollisionWorld::new();
    world.add_collider(
        BoundingSphere::new(Vec3::new(10.0, 0.0, 1.5), 0.6),
        CollisionLayers::ENVIRONMENT,
        None,
    );

    for i in 0..5 {
        sim.fire(dummy, Vec3::new(i as f32 * 10.0, 0.0, 0.0), forward());
    }
    let before: Vec<f32> = sim.slots().iter().map(|s| s.position.x).collect();

    sim.update(&world, DT);
    sim.update(&world, DT);
    assert_eq!(sim.active_count(), 4);

    // Every surviving lane is still present exactly once, and each slot
    // still pairs with the instance handle it was fired with
    let mut lanes: Vec<f32> = sim.slots().iter().map(|s| s.previous_position.x).collect();
    lanes.sort_by(f32::total_cmp);
    let mut expected: Vec<f32> = before.iter().copied().filter(|&x| x != 10.0).collect();
    expected.sort_by(f32::total_cmp);
    assert_eq!(lanes, expected);

    for (slot, handle) in sim.slots().iter().zip(sim.handles()) {
        let instance = sim.pool(handle.archetype).instance(handle.index);
        assert!(instance.visible);
        assert!(relative_eq!(
            instance.transform.position.x,
            slot.position.x,
            epsilon = 1.0e-4
        ));
    }
}

#[test]
fn zero_velocity_keeps_previous_orientation() {
    let mut config = SimulationConfig::default();
    config.archetypes.push(ArchetypeConfig {
        name: "mine".to_string(),
        base_damage: 10.0,
        base_speed: 1.0,
        initial_pool_size: 1,
        max_lifetime: 60.0,
        motion: MotionProfile::Inert,
    });
    let mut sim = BulletSimulation::new(config).unwrap();
    let mine = sim.archetype_id("mine").unwrap();
    let world = CollisionWorld::new();

    // Zero direction gives zero velocity; the instance must keep its
    // default orientation instead of picking up NaNs
    sim.fire(mine, Vec3::new(0.0, 1.0, 0.0), Vec3::zeros());
    let before = sim.pool(mine).instance(0).transform.rotation;

    for _ in 0..5 {
        sim.update(&world, DT);
    }

    assert_eq!(sim.active_count(), 1);
    let instance = sim.pool(mine).instance(0);
    assert_eq!(instance.transform.rotation, before);
    assert!(instance
        .transform
        .position
        .iter()
        .all(|c| c.is_finite()));
}

#[test]
fn randomized_queries_keep_result_order() {
    let mut rng = rand::thread_rng();

    let mut world = CollisionWorld::new();
    for _ in 0..40 {
        let center = Vec3::new(
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
        );
        world.add_collider(
            BoundingSphere::new(center, rng.gen_range(0.5..3.0)),
            CollisionLayers::ENVIRONMENT,
            None,
        );
    }

    let queries: Vec<RayQuery> = (0..200)
        .map(|_| {
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0f32),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let direction = if direction.norm_squared() > 1.0e-6 {
                direction.normalize()
            } else {
                Vec3::new(0.0, 0.0, 1.0)
            };
            RayQuery {
                origin: Vec3::new(
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                    rng.gen_range(-30.0..30.0),
                ),
                direction,
                max_distance: rng.gen_range(0.0..60.0),
                mask: CollisionLayers::ALL,
            }
        })
        .collect();

    // Reference: resolve each query alone, in order
    let expected: Vec<Option<RayHit>> = queries.iter().map(|q| world.cast_ray(q)).collect();

    let mut results = vec![None; queries.len()];
    for batch_size in [1, 3, 16, 64, 1000] {
        results.fill(None);
        bullet_engine::physics::dispatch_batch(&world, &queries, &mut results, batch_size);
        assert_eq!(results, expected, "batch size {batch_size}");
    }
}

#[test]
fn multiple_archetypes_pool_independently() {
    let mut config = SimulationConfig::default();
    config.archetypes.push(ArchetypeConfig {
        name: "slug".to_string(),
        base_damage: 8.0,
        base_speed: 40.0,
        initial_pool_size: 2,
        max_lifetime: 2.0,
        motion: MotionProfile::Inert,
    });
    let mut sim = BulletSimulation::new(config).unwrap();
    let dummy = sim.archetype_id("dummy").unwrap();
    let slug = sim.archetype_id("slug").unwrap();

    sim.fire(dummy, Vec3::zeros(), forward());
    sim.fire(slug, Vec3::zeros(), forward());
    sim.fire(slug, Vec3::zeros(), forward());

    assert_eq!(sim.pool(dummy).size(), 1);
    assert_eq!(sim.pool(slug).size(), 2, "prewarmed slug pool must not grow");
    assert_eq!(sim.pool(dummy).active(), 1);
    assert_eq!(sim.pool(slug).active(), 2);
    assert_eq!(sim.active_count(), 3);
}
