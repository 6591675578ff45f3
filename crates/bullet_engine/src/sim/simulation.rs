//! Frame coordination for the projectile simulation
//!
//! `BulletSimulation` owns the four index-parallel slot buffers (state,
//! instance handles, queries, results) and the per-archetype instance
//! pools. Each `update` runs the frame pipeline in a fixed order:
//!
//! 1. parallel motion pass (fans out, joins),
//! 2. serial transform sync to the pooled instances,
//! 3. batched query dispatch (fans out, joins),
//! 4. serial resolve: contact delivery, swap-back compaction, instance
//!    release.
//!
//! Only `fire` and the resolve pass ever change buffer lengths, and both
//! run on the coordinating thread; the `&mut self` receivers make it
//! impossible to fire while a parallel phase is in flight.

use crate::foundation::math::{look_along, Vec3};
use crate::physics::collision_world::CollisionWorld;
use crate::physics::primitives::RayHit;
use crate::physics::raycast::{dispatch_batch, RayQuery};
use crate::sim::config::{ArchetypeId, SimulationConfig, SimulationError};
use crate::sim::events::{ContactEvent, ContactHandler};
use crate::sim::kernel;
use crate::sim::pool::InstancePool;
use crate::sim::state::{BulletData, InstanceHandle};

/// The projectile simulation: pools, slot buffers, and the frame pipeline
pub struct BulletSimulation {
    config: SimulationConfig,
    pools: Vec<InstancePool>,

    // The four index-parallel slot buffers. Entry `i` of each describes
    // the same live projectile; lengths are equal outside the resolve
    // pass.
    state: Vec<BulletData>,
    instances: Vec<InstanceHandle>,
    queries: Vec<RayQuery>,
    results: Vec<Option<RayHit>>,

    handler: Option<Box<dyn ContactHandler>>,
    time: f32,
    active: u32,
}

impl BulletSimulation {
    /// Build a simulation from a validated configuration.
    ///
    /// Misconfiguration (empty archetype table, malformed descriptor)
    /// aborts construction with an error naming the offending archetype.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        log::info!(
            "initializing projectile simulation: {} archetypes, slot capacity {}",
            config.archetypes.len(),
            config.initial_capacity
        );

        let pools = config
            .archetypes
            .iter()
            .map(|a| InstancePool::new(&a.name, a.initial_pool_size, config.pool_soft_ceiling))
            .collect();

        let capacity = config.initial_capacity;
        Ok(Self {
            pools,
            state: Vec::with_capacity(capacity),
            instances: Vec::with_capacity(capacity),
            queries: Vec::with_capacity(capacity),
            results: Vec::with_capacity(capacity),
            handler: None,
            time: 0.0,
            active: 0,
            config,
        })
    }

    /// Register the handler that receives contact events during resolve
    pub fn set_contact_handler(&mut self, handler: Box<dyn ContactHandler>) {
        self.handler = Some(handler);
    }

    /// Look up an archetype id by its configured name
    pub fn archetype_id(&self, name: &str) -> Option<ArchetypeId> {
        self.config
            .archetypes
            .iter()
            .position(|a| a.name == name)
            .map(|i| ArchetypeId::new(i as u32))
    }

    /// Fire a projectile with default multipliers.
    ///
    /// `direction` is expected to be normalized by the caller.
    pub fn fire(&mut self, archetype: ArchetypeId, origin: Vec3, direction: Vec3) {
        self.fire_scaled(archetype, origin, direction, 1.0, 1.0);
    }

    /// Fire a projectile, scaling the archetype's base damage and speed.
    ///
    /// Acquires a pooled instance (reuse before growth), appends the
    /// slot's state and a placeholder query/result, and increments the
    /// active count by exactly one. Must be called between frames, never
    /// while `update` is running (the borrow checker enforces this).
    ///
    /// # Panics
    ///
    /// Panics if `archetype` is not an index into the configured table.
    /// An unconfigured archetype is a fatal setup error, not a condition
    /// to swallow at the fire site.
    pub fn fire_scaled(
        &mut self,
        archetype: ArchetypeId,
        origin: Vec3,
        direction: Vec3,
        damage_multiplier: f32,
        speed_multiplier: f32,
    ) {
        let descriptor = self.config.archetypes.get(archetype.index()).unwrap_or_else(|| {
            panic!(
                "projectile archetype index {} is not configured ({} archetypes)",
                archetype.index(),
                self.config.archetypes.len()
            )
        });

        let velocity = direction * descriptor.base_speed * speed_multiplier;
        let damage = descriptor.base_damage * damage_multiplier;

        let pool = &mut self.pools[archetype.index()];
        let index = pool.acquire();
        pool.instance_mut(index).transform.position = origin;

        self.state
            .push(BulletData::new(archetype, origin, velocity, damage, self.time));
        self.instances.push(InstanceHandle { archetype, index });
        self.queries
            .push(RayQuery::zero_length(origin, self.config.collision_mask));
        self.results.push(None);
        self.active += 1;
    }

    /// Advance the simulation one frame.
    ///
    /// Runs the full pipeline: motion kernel, transform sync, batched
    /// dispatch against `world`, then the resolve pass. Each parallel
    /// phase joins before the next begins.
    pub fn update(&mut self, world: &CollisionWorld, dt: f32) {
        self.time += dt;
        self.check_alignment();

        kernel::run_motion_pass(
            &self.config.archetypes,
            self.config.collision_mask,
            &mut self.state,
            &mut self.queries,
            self.time,
            dt,
        );
        self.sync_transforms();

        dispatch_batch(
            world,
            &self.queries,
            &mut self.results,
            self.config.raycast_batch_size,
        );

        self.resolve(world);
    }

    /// Release every live slot and drop all buffered work.
    ///
    /// The owning application calls this when tearing the simulation
    /// down; pools retain their (hidden) instances so a later fire would
    /// reuse them, and `Drop` remains a correct backstop for the buffers
    /// themselves.
    pub fn shutdown(&mut self) {
        log::info!(
            "projectile simulation shutdown: releasing {} active projectiles",
            self.state.len()
        );

        while let Some(handle) = self.instances.pop() {
            self.pools[handle.archetype.index()].release(handle.index);
        }
        self.state.clear();
        self.queries.clear();
        self.results.clear();
        self.active = 0;
    }

    /// Number of live projectiles
    pub fn active_count(&self) -> u32 {
        self.active
    }

    /// Current simulation time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// The configuration this simulation was built from
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Per-slot projectile state, in slot order
    pub fn slots(&self) -> &[BulletData] {
        &self.state
    }

    /// Instance handles, index-aligned with [`Self::slots`]
    pub fn handles(&self) -> &[InstanceHandle] {
        &self.instances
    }

    /// The instance pool serving one archetype
    pub fn pool(&self, archetype: ArchetypeId) -> &InstancePool {
        &self.pools[archetype.index()]
    }

    /// Lengths of the four slot buffers, for diagnostics and tests
    pub fn buffer_lengths(&self) -> [usize; 4] {
        [
            self.state.len(),
            self.instances.len(),
            self.queries.len(),
            self.results.len(),
        ]
    }

    /// Write each slot's position and orientation to its pooled instance.
    ///
    /// Runs serially between the kernel join and the query dispatch; slot
    /// buffers and pools are disjoint, but instances live outside the
    /// slot arrays so the writes stay on the coordinating thread. A slot
    /// with zero velocity keeps its previous orientation.
    fn sync_transforms(&mut self) {
        for (data, handle) in self.state.iter().zip(self.instances.iter()) {
            let instance = self.pools[handle.archetype.index()].instance_mut(handle.index);
            instance.transform.position = data.position;
            if let Some(rotation) = look_along(data.velocity) {
                instance.transform.rotation = rotation;
            }
        }
    }

    /// The serial resolve pass: remove expired and colliding slots.
    ///
    /// Swap-back removal moves the last slot into the vacated index, so
    /// the same index is re-examined after every removal and no slot is
    /// skipped.
    fn resolve(&mut self, world: &CollisionWorld) {
        let mut slot = 0;
        while slot < self.state.len() {
            if self.state[slot].to_be_killed {
                self.remove_slot(slot, None, world);
                continue;
            }

            if let Some(hit) = self.results[slot] {
                // The final rendered position is the exact hit point
                let handle = self.instances[slot];
                self.pools[handle.archetype.index()]
                    .instance_mut(handle.index)
                    .transform
                    .position = hit.point;
                self.remove_slot(slot, Some(hit), world);
                continue;
            }

            slot += 1;
        }
    }

    /// Remove one slot from all four buffers and release its instance
    fn remove_slot(&mut self, slot: usize, hit: Option<RayHit>, world: &CollisionWorld) {
        let handle = self.instances[slot];
        let data = self.state[slot];

        let surface = hit.and_then(|h| world.collider(h.collider).and_then(|c| c.surface));
        let event = ContactEvent {
            archetype: data.archetype,
            target: hit.map(|h| h.collider),
            surface,
            position: hit.map_or(data.position, |h| h.point),
            damage: data.damage,
        };
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.on_contact(&event);
        }

        self.state.swap_remove(slot);
        self.instances.swap_remove(slot);
        self.queries.swap_remove(slot);
        self.results.swap_remove(slot);
        self.pools[handle.archetype.index()].release(handle.index);
        self.active -= 1;
    }

    /// Verify the four slot buffers are index-aligned.
    ///
    /// A divergence is an internal invariant violation: fatal in debug
    /// builds, contained in release by truncating to the common length
    /// (orphaned instances are released so the pools stay consistent).
    fn check_alignment(&mut self) {
        let lengths = self.buffer_lengths();
        let aligned = lengths.iter().all(|&l| l == lengths[0]);
        debug_assert!(
            aligned,
            "projectile slot buffers diverged: state {}, instances {}, queries {}, results {}",
            lengths[0], lengths[1], lengths[2], lengths[3]
        );

        if !aligned {
            log::error!(
                "projectile slot buffers diverged (state {}, instances {}, queries {}, results {}); truncating to the common length",
                lengths[0], lengths[1], lengths[2], lengths[3]
            );
            let common = *lengths.iter().min().unwrap_or(&0);
            while self.instances.len() > common {
                if let Some(handle) = self.instances.pop() {
                    self.pools[handle.archetype.index()].release(handle.index);
                }
            }
            self.state.truncate(common);
            self.queries.truncate(common);
            self.results.truncate(common);
            self.active = common as u32;
        }
    }
}
