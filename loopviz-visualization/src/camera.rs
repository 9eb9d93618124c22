//! Camera orientation for 3D visualization

use loopviz_core::{Point3d, Vector3d};
use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// An orbiting camera described by roll, azimuth and elevation in degrees.
///
/// At zero angles the camera looks along +y with +z up. Azimuth turns the
/// view clockwise about z seen from above, elevation tilts it down and roll
/// spins it about the view direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub focal_point: Point3d,
    pub distance: f64,
    pub roll: f64,
    pub azimuth: f64,
    pub elevation: f64,
}

impl Camera {
    pub fn new(focal_point: Point3d, distance: f64) -> Self {
        Self {
            focal_point,
            distance,
            roll: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
        }
    }

    /// Set `[roll, azimuth, elevation]` in degrees
    pub fn rotate(&mut self, angles: [f64; 3]) {
        let [roll, azimuth, elevation] = angles;
        self.roll = roll;
        self.azimuth = azimuth;
        self.elevation = elevation;
    }

    fn orientation(&self) -> UnitQuaternion<f64> {
        let turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -self.azimuth.to_radians());
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -self.elevation.to_radians());
        turn * tilt
    }

    /// Unit vector from the camera towards the focal point
    pub fn view_direction(&self) -> Vector3d {
        self.orientation() * Vector3d::y()
    }

    /// Unit up vector after roll
    pub fn view_up(&self) -> Vector3d {
        let q = self.orientation();
        let direction = Unit::new_normalize(q * Vector3d::y());
        let roll = UnitQuaternion::from_axis_angle(&direction, self.roll.to_radians());
        roll * (q * Vector3d::z())
    }

    pub fn position(&self) -> Point3d {
        self.focal_point - self.view_direction() * self.distance
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.position(), &self.focal_point, &self.view_up())
    }

    /// Frame the given bounds, keeping the current angles
    pub fn reset_to_bounds(&mut self, min: Point3d, max: Point3d) {
        self.focal_point = nalgebra::center(&min, &max);
        let diagonal = (max - min).norm();
        self.distance = if diagonal > 0.0 { diagonal * 1.5 } else { 1.0 };
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3d::origin(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_orientation() {
        let camera = Camera::default();
        assert_relative_eq!(camera.view_direction(), Vector3d::y(), epsilon = 1e-12);
        assert_relative_eq!(camera.view_up(), Vector3d::z(), epsilon = 1e-12);
        assert_relative_eq!(camera.position(), Point3d::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotate() {
        let mut camera = Camera::default();
        camera.rotate([0.0, 90.0, 0.0]);
        assert_relative_eq!(camera.view_direction(), Vector3d::x(), epsilon = 1e-12);

        camera.rotate([0.0, 0.0, 90.0]);
        assert_relative_eq!(camera.view_direction(), -Vector3d::z(), epsilon = 1e-12);
        assert_relative_eq!(camera.view_up(), Vector3d::y(), epsilon = 1e-12);

        camera.rotate([90.0, 0.0, 0.0]);
        let up = camera.view_up();
        assert_relative_eq!(up.dot(&camera.view_direction()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(up.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_to_bounds() {
        let mut camera = Camera::default();
        camera.reset_to_bounds(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 1.0));
        assert_relative_eq!(camera.focal_point, Point3d::new(1.0, 1.0, 0.5));
        assert_relative_eq!(camera.distance, 4.5);
    }
}
