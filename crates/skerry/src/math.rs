//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] type provides position, rotation,
//! and scale for every game object.

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

/// Position, rotation, and scale of a game object relative to its parent.
///
/// Rotation is stored as Euler angles in radians and composed Z·Y·X, which is
/// what entity-spec documents describe (`rotation: { y: -0.785 }`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with the given per-axis scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Return a copy with the given Euler rotation (radians).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation as a quaternion (Z·Y·X order).
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.rotation.z, self.rotation.y, self.rotation.x)
    }

    /// Compute the 4x4 local matrix: translation · rotation · scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Translation part of a world matrix.
pub fn matrix_position(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::IDENTITY.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_translates_after_scaling() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(Vec3::splat(2.0));
        let p = t.matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_about_y() {
        let t = Transform::IDENTITY.with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let p = t.matrix().transform_point3(Vec3::X);
        // +X rotated a quarter turn about +Y lands on -Z.
        assert!((p - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn position_of_matrix() {
        let m = Transform::from_xyz(4.0, -1.0, 0.5).matrix();
        assert_eq!(matrix_position(&m), Vec3::new(4.0, -1.0, 0.5));
    }
}
