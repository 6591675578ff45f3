//! Collision layer system for filtering ray queries
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! Projectile queries are one-directional: a ray carries a mask and a
//! collider carries a layer; the collider is a candidate iff its layer is
//! present in the ray's mask.

/// Collision layer definitions for efficient filtering
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Static environment geometry
    pub const ENVIRONMENT: u32 = 1 << 0;

    /// Units and characters
    pub const UNIT: u32 = 1 << 1;

    /// Projectiles themselves (excluded from the default query mask so
    /// bullets never collide with each other)
    pub const PROJECTILE: u32 = 1 << 2;

    /// Debris and small physics objects
    pub const DEBRIS: u32 = 1 << 3;

    /// Trigger volumes (no physical response)
    pub const TRIGGER: u32 = 1 << 4;

    /// Check whether a collider layer is a candidate for a query mask
    pub fn mask_contains(mask: u32, layer: u32) -> bool {
        (mask & layer) != 0
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[u32]) -> u32 {
        layers.iter().fold(0, |acc, &layer| acc | layer)
    }
}
