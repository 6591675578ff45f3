//! Swarm demo application
//!
//! Headless stress demo for the projectile engine: fires volleys at a
//! ring of targets every few frames and logs pool and contact statistics
//! while the simulation runs at a fixed timestep.

use std::cell::RefCell;
use std::rc::Rc;

use bullet_engine::prelude::*;
use rand::Rng;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 600;
const VOLLEY_SIZE: u32 = 24;
const VOLLEY_INTERVAL: u32 = 6;
const CONFIG_PATH: &str = "swarm_demo.toml";

fn demo_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.archetypes.push(ArchetypeConfig {
        name: "mortar".to_string(),
        base_damage: 12.0,
        base_speed: 18.0,
        initial_pool_size: 64,
        max_lifetime: 6.0,
        motion: MotionProfile::Accelerated(Vec3::new(0.0, -9.8, 0.0)),
    });
    config
}

fn build_target_ring(world: &mut CollisionWorld) {
    let surfaces = [
        Some(SurfaceKind::Metal),
        Some(SurfaceKind::Concrete),
        Some(SurfaceKind::Wood),
        None,
    ];

    for i in 0..12 {
        let angle = i as f32 * std::f32::consts::TAU / 12.0;
        let center = Vec3::new(angle.cos() * 15.0, 0.0, angle.sin() * 15.0);
        world.add_collider(
            BoundingSphere::new(center, 2.0),
            CollisionLayers::ENVIRONMENT,
            surfaces[i % surfaces.len()],
        );
    }
}

/// Counts contacts by kind for the end-of-run report
#[derive(Default)]
struct ContactStats {
    impacts: u32,
    expiries: u32,
    damage_dealt: f32,
}

impl ContactStats {
    fn record(&mut self, event: &ContactEvent) {
        if event.is_impact() {
            self.impacts += 1;
            self.damage_dealt += event.damage;
            if let Some(surface) = event.surface {
                log::debug!("impact on {surface:?} at {:?}", event.position);
            }
        } else {
            self.expiries += 1;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut world = CollisionWorld::new();
    build_target_ring(&mut world);

    let config = if std::path::Path::new(CONFIG_PATH).exists() {
        log::info!("loading settings from {CONFIG_PATH}");
        SimulationConfig::load_from_file(CONFIG_PATH)?
    } else {
        demo_config()
    };
    let mut sim = BulletSimulation::new(config)?;

    let stats = Rc::new(RefCell::new(ContactStats::default()));
    let sink = Rc::clone(&stats);
    sim.set_contact_handler(Box::new(move |event: &ContactEvent| {
        sink.borrow_mut().record(event);
    }));

    let dummy = sim.archetype_id("dummy").expect("baseline archetype");
    let mortar = sim.archetype_id("mortar").expect("mortar archetype");

    let mut rng = rand::thread_rng();
    let mut timer = Timer::new();

    log::info!("running {FRAMES} frames against {} targets", world.len());

    for frame in 0..FRAMES {
        if frame % VOLLEY_INTERVAL == 0 {
            for _ in 0..VOLLEY_SIZE {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let direction = Vec3::new(angle.cos(), 0.0, angle.sin());
                sim.fire(dummy, Vec3::zeros(), direction);
            }
            // One lobbed shot per volley to exercise the accelerated profile
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let direction = Vec3::new(angle.cos() * 0.8, 0.6, angle.sin() * 0.8).normalize();
            sim.fire_scaled(mortar, Vec3::zeros(), direction, 1.5, 1.0);
        }

        sim.update(&world, FRAME_DT);
        timer.update();

        if frame % 60 == 0 {
            log::info!(
                "frame {frame:4}: {} active, dummy pool {}, mortar pool {}",
                sim.active_count(),
                sim.pool(dummy).size(),
                sim.pool(mortar).size()
            );
        }
    }

    let stats = stats.borrow();
    log::info!(
        "done in {:.2}s ({:.0} fps average): {} impacts for {:.0} damage, {} expiries, {} still in flight",
        timer.total_time(),
        timer.average_fps(),
        stats.impacts,
        stats.damage_dealt,
        stats.expiries,
        sim.active_count()
    );

    sim.shutdown();
    Ok(())
}
