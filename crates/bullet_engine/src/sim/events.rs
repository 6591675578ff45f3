//! Contact notification delivery
//!
//! When the resolve pass removes a slot it emits a [`ContactEvent`] to
//! the handler registered on the simulation. Handlers run on the
//! coordinating thread, inside the resolve pass, after the slot's
//! instance has been positioned at its final location.

use crate::foundation::math::Vec3;
use crate::physics::collision_world::{ColliderKey, SurfaceKind};
use crate::sim::config::ArchetypeId;

/// Notification emitted when a projectile ends, by impact or expiry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    /// Archetype of the projectile that ended
    pub archetype: ArchetypeId,

    /// The struck collider; `None` when the projectile expired in flight
    pub target: Option<ColliderKey>,

    /// Surface classification declared by the struck collider, if any
    pub surface: Option<SurfaceKind>,

    /// Final world position (the exact hit point for impacts)
    pub position: Vec3,

    /// Damage carried by the projectile
    pub damage: f32,
}

impl ContactEvent {
    /// Whether this event was caused by an impact rather than expiry
    pub fn is_impact(&self) -> bool {
        self.target.is_some()
    }
}

/// Handler receiving contact events during the resolve pass.
/// Implementations must not call back into the simulation; they see each
/// event exactly once, in slot order.
pub trait ContactHandler {
    /// Called once per removed slot
    fn on_contact(&mut self, event: &ContactEvent);
}

/// Blanket impl so plain closures can be registered as handlers
impl<F: FnMut(&ContactEvent)> ContactHandler for F {
    fn on_contact(&mut self, event: &ContactEvent) {
        self(event);
    }
}
