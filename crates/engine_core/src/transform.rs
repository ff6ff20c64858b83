//! Transform component and utilities for spatial positioning.

use glam::{Mat3, Quat, Vec3};

/// Position and orientation of a character or probe origin.
///
/// Y is up. The forward axis is negative Z rotated by `rotation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Forward direction flattened onto the horizontal plane.
    pub fn forward_2d(&self) -> Vec3 {
        crate::safe_normal_2d(self.forward())
    }

    /// Heading around the Y axis in radians. Zero faces negative Z.
    pub fn yaw(&self) -> f32 {
        let forward = self.forward();
        (-forward.x).atan2(-forward.z)
    }

    /// Replace the orientation with a pure yaw.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_y(yaw);
    }

    /// Drop pitch and roll, keeping the current heading.
    pub fn level(&mut self) {
        let yaw = self.yaw();
        self.set_yaw(yaw);
    }
}

/// Yaw (radians) that makes `forward()` point along `direction` projected on XZ.
pub fn yaw_toward(direction: Vec3) -> Option<f32> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1.0e-8 {
        return None;
    }
    Some((-flat.x).atan2(-flat.z))
}

/// Orientation whose forward axis is `forward` and whose up axis is as close to `up` as possible.
///
/// Returns `None` if the two vectors are degenerate or parallel.
pub fn rotation_from_forward_up(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z_axis = (-forward).try_normalize()?;
    let x_axis = up.cross(z_axis).try_normalize()?;
    let y_axis = z_axis.cross(x_axis);
    Some(Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_axis)).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_faces_negative_z() {
        let t = Transform::default();
        assert!((t.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((t.right() - Vec3::X).length() < 1e-6);
        assert!(t.yaw().abs() < 1e-6);
    }

    #[test]
    fn yaw_toward_round_trips_through_forward() {
        let dir = Vec3::new(1.0, 0.3, 1.0);
        let mut t = Transform::default();
        t.set_yaw(yaw_toward(dir).unwrap());
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert!((t.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn forward_up_rotation_tilts_on_slopes() {
        let up = Vec3::new(0.0, 1.0, 1.0).normalize();
        let forward = Vec3::new(0.0, 1.0, -1.0).normalize();
        let rot = rotation_from_forward_up(forward, up).unwrap();
        let t = Transform::from_position_rotation(Vec3::ZERO, rot);
        assert!((t.forward() - forward).length() < 1e-5);
        assert!((t.up() - up).length() < 1e-5);
    }

    #[test]
    fn level_keeps_heading() {
        let rot = rotation_from_forward_up(Vec3::new(1.0, -0.5, 0.0), Vec3::new(0.5, 1.0, 0.0))
            .unwrap();
        let mut t = Transform::from_position_rotation(Vec3::ZERO, rot);
        t.level();
        assert!((t.forward() - Vec3::X).length() < 1e-5);
        assert!((t.up() - Vec3::Y).length() < 1e-5);
    }
}
