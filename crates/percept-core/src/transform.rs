//! Rigid 3D transforms
//!
//! Concatenation follows post-multiply order: `a.then(&b)` applies `a` first
//! and `b` second, which is the matrix product `B * A`.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// A rigid transform: rotation followed by translation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self {
            rotation: rotation.normalize(),
            ..Self::IDENTITY
        }
    }

    /// Build a transform from a position and an orientation
    pub fn from_pose(position: DVec3, rotation: DQuat) -> Self {
        Self {
            rotation: rotation.normalize(),
            translation: position,
        }
    }

    /// Orientation from roll (about X), pitch (about Y) and yaw (about Z), in radians
    pub fn rpy_to_quat(rpy: DVec3) -> DQuat {
        DQuat::from_euler(EulerRot::ZYX, rpy.z, rpy.y, rpy.x)
    }

    /// Build a transform from a position and roll/pitch/yaw angles in radians
    pub fn from_xyz_rpy(position: DVec3, rpy: DVec3) -> Self {
        Self::from_pose(position, Self::rpy_to_quat(rpy))
    }

    /// Extract the rigid part of a 4x4 matrix. Any scale is discarded.
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            rotation: rotation.normalize(),
            translation,
        }
    }

    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            rotation: (next.rotation * self.rotation).normalize(),
            translation: next.rotation * self.translation + next.translation,
        }
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Return a copy moved by `delta` in the parent frame
    pub fn translated(&self, delta: DVec3) -> Transform {
        Transform {
            rotation: self.rotation,
            translation: self.translation + delta,
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    pub fn transform_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation * vector
    }

    pub fn position(&self) -> DVec3 {
        self.translation
    }

    /// Orientation as (roll, pitch, yaw) in radians
    pub fn orientation_rpy(&self) -> DVec3 {
        let (yaw, pitch, roll) = self.rotation.to_euler(EulerRot::ZYX);
        DVec3::new(roll, pitch, yaw)
    }

    pub fn x_axis(&self) -> DVec3 {
        self.transform_vector(DVec3::X)
    }

    pub fn y_axis(&self) -> DVec3 {
        self.transform_vector(DVec3::Y)
    }

    pub fn z_axis(&self) -> DVec3 {
        self.transform_vector(DVec3::Z)
    }

    /// Compare as matrices, so `q` and `-q` rotations are equal
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f64) -> bool {
        self.to_matrix()
            .abs_diff_eq(other.to_matrix(), max_abs_diff)
    }
}

/// The transform that takes pose `a` to pose `b`: apply `b`, then undo `a`
pub fn compute_a_to_b(a: &Transform, b: &Transform) -> Transform {
    b.then(&a.inverse())
}
