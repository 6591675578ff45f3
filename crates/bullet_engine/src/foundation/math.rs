//! Math utilities and types
//!
//! Provides the fundamental math types used by the simulation.

pub use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Rotation that orients the local +Z axis along `direction`.
///
/// Returns `None` for a zero-length or non-finite direction; callers keep
/// their previous orientation in that case instead of normalizing a zero
/// vector.
pub fn look_along(direction: Vec3) -> Option<Quat> {
    if direction.norm_squared() <= f32::EPSILON || !direction.iter().all(|c| c.is_finite()) {
        return None;
    }
    // A direction parallel to +Y would degenerate the basis; fall back to
    // +X as the up reference for near-vertical shots.
    let up = if direction.cross(&Vec3::y()).norm_squared() > 1.0e-8 {
        Vec3::y()
    } else {
        Vec3::x()
    };
    Some(UnitQuaternion::face_towards(&direction, &up))
}
