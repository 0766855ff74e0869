//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] type provides position, rotation,
//! and scale for 2D entities.
//!
//! ## Rotation in 2D
//!
//! Rotation is stored as a quaternion so the local matrix composes the usual
//! way, but only the Z axis is ever used. [`Transform::rotation_z`] and
//! [`Transform::set_rotation_z`] are the only ways the rest of the crate
//! touches it, and they are exact inverses for angles in (−π, π].

use std::f32::consts::PI;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// A 2D transform: position, Z rotation, and scale.
///
/// Position and scale are full 3-vectors (Z is kept for sorting and ignored by
/// the 2D systems).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Create a transform at the given 2D position (z = 0).
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_xyz(x, y, 0.0)
    }

    /// Return a copy rotated to `radians` around Z.
    pub fn with_rotation_z(mut self, radians: f32) -> Self {
        self.set_rotation_z(radians);
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Z rotation in radians, in (−π, π].
    pub fn rotation_z(&self) -> f32 {
        quat_to_angle(self.rotation)
    }

    /// Replace the rotation with a pure Z rotation of `radians`.
    pub fn set_rotation_z(&mut self, radians: f32) {
        self.rotation = angle_to_quat(radians);
    }

    /// Z rotation in degrees.
    pub fn rotation_z_degrees(&self) -> f32 {
        self.rotation_z().to_degrees()
    }

    /// Replace the rotation with a pure Z rotation of `degrees`.
    pub fn set_rotation_z_degrees(&mut self, degrees: f32) {
        self.set_rotation_z(degrees.to_radians());
    }

    /// Compute the 4x4 local matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Extract the Z angle from a pure Z-axis quaternion.
///
/// `q = (0, 0, sin(θ/2), cos(θ/2))`, so `θ = 2·atan2(z, w)`. The result is
/// folded into (−π, π].
pub fn quat_to_angle(q: Quat) -> f32 {
    let angle = 2.0 * q.z.atan2(q.w);
    wrap_angle(angle)
}

/// Build a pure Z-axis quaternion.
pub fn angle_to_quat(angle: f32) -> Quat {
    Quat::from_rotation_z(angle)
}

/// Fold an angle into (−π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// A rectangle in pixel space.
///
/// Used by [`SpriteDefinition`](crate::asset::SpriteDefinition) to select a
/// sub-region of a texture. `min` is the top-left corner, `max` the
/// bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build from a pixel origin and size.
    pub fn from_pixels(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Normalize into UV space for a texture of the given pixel size.
    pub fn to_uv(&self, texture_size: Vec2) -> Rect {
        Rect {
            min: self.min / texture_size,
            max: self.max / texture_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::IDENTITY.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_round_trip_examples() {
        for deg in [0.0f32, 45.0, 90.0, -90.0, 179.0, -179.0] {
            let t = Transform::default().with_rotation_z(deg.to_radians());
            let back = t.rotation_z_degrees();
            assert!((back - deg).abs() < 1e-3, "{deg} -> {back}");
        }
    }

    #[test]
    fn rotation_is_pure_z() {
        let t = Transform::default().with_rotation_z(1.0);
        assert_eq!(t.rotation.x, 0.0);
        assert_eq!(t.rotation.y, 0.0);
    }

    #[test]
    fn rect_size_and_uv() {
        let r = Rect::from_pixels(16.0, 32.0, 16.0, 16.0);
        assert_eq!(r.size(), Vec2::new(16.0, 16.0));
        let uv = r.to_uv(Vec2::new(64.0, 64.0));
        assert_eq!(uv.min, Vec2::new(0.25, 0.5));
        assert_eq!(uv.max, Vec2::new(0.5, 0.75));
    }

    proptest! {
        #[test]
        fn rotation_injection_extraction_inverse(angle in -3.14f32..=3.14f32) {
            let mut t = Transform::default();
            t.set_rotation_z(angle);
            prop_assert!((t.rotation_z() - angle).abs() < 1e-4);
        }
    }
}
