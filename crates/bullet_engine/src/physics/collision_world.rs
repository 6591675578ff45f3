//! Collider registry and narrow-phase ray casting
//!
//! The collision world owns the set of targets that projectile rays are
//! cast against each frame. Colliders are registered and removed by game
//! logic between frames; the batched dispatch only ever reads the
//! registry. Keys are generation-checked slotmap handles, so a key held
//! across a remove cannot alias a newly registered collider.

use slotmap::SlotMap;

use crate::physics::collision_layers::CollisionLayers;
use crate::physics::primitives::{BoundingSphere, Ray, RayHit};
use crate::physics::raycast::RayQuery;

slotmap::new_key_type! {
    /// Stable key identifying a registered collider
    pub struct ColliderKey;
}

/// Surface classification reported in contact events when the struck
/// collider declares one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Bare metal plating
    Metal,
    /// Concrete and masonry
    Concrete,
    /// Wooden structures
    Wood,
    /// Organic targets
    Flesh,
}

/// A registered ray-query target
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    /// World-space bounds tested against rays
    pub sphere: BoundingSphere,

    /// Collision layer this collider belongs to
    pub layer: u32,

    /// Optional surface classification carried into contact events
    pub surface: Option<SurfaceKind>,
}

/// Registry of ray-query targets
#[derive(Default)]
pub struct CollisionWorld {
    colliders: SlotMap<ColliderKey, Collider>,
}

impl CollisionWorld {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            colliders: SlotMap::with_key(),
        }
    }

    /// Register a collider and return its key
    pub fn add_collider(
        &mut self,
        sphere: BoundingSphere,
        layer: u32,
        surface: Option<SurfaceKind>,
    ) -> ColliderKey {
        self.colliders.insert(Collider {
            sphere,
            layer,
            surface,
        })
    }

    /// Remove a collider, returning it if the key was live
    pub fn remove_collider(&mut self, key: ColliderKey) -> Option<Collider> {
        self.colliders.remove(key)
    }

    /// Look up a collider by key
    pub fn collider(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key)
    }

    /// Update a collider's world-space bounds (for moving targets)
    pub fn set_collider_sphere(&mut self, key: ColliderKey, sphere: BoundingSphere) {
        if let Some(collider) = self.colliders.get_mut(key) {
            collider.sphere = sphere;
        }
    }

    /// Number of registered colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the world has no colliders
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Cast a single query against every registered collider, returning
    /// the nearest hit within the query's length, if any.
    ///
    /// Zero-length queries (placeholder slots, stationary projectiles)
    /// never hit.
    pub fn cast_ray(&self, query: &RayQuery) -> Option<RayHit> {
        if query.max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(query.origin, query.direction);
        let mut nearest: Option<RayHit> = None;

        for (key, collider) in &self.colliders {
            if !CollisionLayers::mask_contains(query.mask, collider.layer) {
                continue;
            }

            if let Some((distance, point, normal)) = collider.sphere.intersect_ray(&ray) {
                if distance > query.max_distance {
                    continue;
                }
                if nearest.map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(RayHit {
                        collider: key,
                        distance,
                        point,
                        normal,
                    });
                }
            }
        }

        nearest
    }
}
