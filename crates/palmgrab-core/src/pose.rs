//! Rigid world-space poses.

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Position and orientation of a tracked joint or a grabbable in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position in metres.
    pub position: Vec3,
    /// World orientation.
    #[serde(default = "identity")]
    pub rotation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Pose at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from a position and rotation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create an unrotated pose at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Rotate a local-space direction into world space.
    ///
    /// Directions ignore the position component.
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Rotate a world-space direction into this pose's local space.
    pub fn inverse_transform_direction(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    /// Translate the pose by a world-space offset.
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }

    /// Copy of the pose with a unit-length rotation.
    pub fn normalized(self) -> Self {
        Self {
            rotation: unit_rotation(self.rotation),
            ..self
        }
    }

    /// Check that the position is finite and the rotation is a unit quaternion.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.rotation.is_normalized()
    }
}

/// Scale `rotation` to unit length. Zero or non-finite input maps to identity.
pub fn unit_rotation(rotation: Quat) -> Quat {
    Vec4::from(rotation)
        .try_normalize()
        .map_or(Quat::IDENTITY, Quat::from_vec4)
}
