//! Vector helpers shared by movement code.

use glam::Vec3;

/// Values below this are treated as zero by the `is_nearly_*` helpers.
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;

/// Remove the component of `v` along the (unit) plane normal.
pub fn plane_project(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Horizontal (XZ) direction of `v`, or zero if it has no horizontal part.
pub fn safe_normal_2d(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

pub fn is_nearly_zero(v: Vec3) -> bool {
    v.length_squared() < KINDA_SMALL_NUMBER * KINDA_SMALL_NUMBER
}

pub fn is_nearly_zero_f32(x: f32) -> bool {
    x.abs() < KINDA_SMALL_NUMBER
}

/// Horizontal part of `v` (Y zeroed).
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
