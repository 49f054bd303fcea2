use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

/// Orbit clamp: ±89° keeps the view direction away from world-up, so the
/// basis cross products below never degenerate.
const MAX_ELEVATION: f32 = 89.0 * PI / 180.0;
/// Closest the eye may orbit to the target.
const MIN_RADIUS: f32 = 0.1;
/// Narrowest orthographic frustum; keeps the projection invertible.
pub const MIN_VIEW_WIDTH: f32 = 0.01;

/// Orbit camera around a movable target point.
///
/// State is spherical (target, radius, elevation, azimuth) plus an
/// orthographic frustum (view width, aspect, near/far). The camera
/// caches three matrices and recomputes them eagerly on every mutation:
///
/// * `view_inverse`: orthonormal right-handed basis columns plus the
///   eye position; maps camera space to world space.
/// * `projection`: orthographic NDC mapping.
/// * `proj_view_inverse = view_inverse * projection⁻¹`: the only matrix
///   consumers read; it unprojects NDC+depth points to world space.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    view_width: f32,
    aspect: f32,
    near: f32,
    far: f32,

    target: Vec3,
    elevation: f32, // radians, clamped to ±89°
    azimuth: f32,   // radians, wrapped to (-π, π]
    radius: f32,

    view_inverse: Mat4,
    projection: Mat4,
    proj_view_inverse: Mat4,
}

impl Camera {
    /// Camera at radius 500 on the +z side of the origin, looking at it.
    pub fn new(view_width: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            view_width: view_width.max(MIN_VIEW_WIDTH),
            aspect,
            near,
            far,
            target: Vec3::ZERO,
            elevation: 0.0,
            azimuth: 0.0,
            radius: 500.0,
            view_inverse: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            proj_view_inverse: Mat4::IDENTITY,
        };
        cam.update_view_inverse();
        cam.update_projection();
        cam.update_proj_view_inverse();
        cam
    }

    /// Combined inverse used to unproject `(x, y, z, 1)` NDC points.
    #[inline]
    pub fn proj_view_inverse(&self) -> Mat4 {
        self.proj_view_inverse
    }

    /// World-space eye position (translation column of `view_inverse`).
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.view_inverse.w_axis.truncate()
    }

    pub fn view_width(&self) -> f32 {
        self.view_width
    }

    /*──────────────────────── orbit / pan / zoom ─────────────────────*/

    /// Tilt the orbit up or down, clamped to ±89°.
    pub fn add_elevation(&mut self, delta_rad: f32) {
        self.elevation = (self.elevation + delta_rad).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.update_view_inverse();
        self.update_proj_view_inverse();
    }

    /// Swing the orbit around world-up; the angle wraps into (-π, π].
    pub fn add_azimuth(&mut self, delta_rad: f32) {
        self.azimuth += delta_rad;
        while self.azimuth <= -PI {
            self.azimuth += TAU;
        }
        while self.azimuth > PI {
            self.azimuth -= TAU;
        }
        self.update_view_inverse();
        self.update_proj_view_inverse();
    }

    /// Dolly toward/away from the target, floored at [`MIN_RADIUS`].
    pub fn add_radius(&mut self, delta: f32) {
        self.radius = (self.radius + delta).max(MIN_RADIUS);
        self.update_view_inverse();
        self.update_proj_view_inverse();
    }

    /// Pan the target along the camera's right axis. The step scales
    /// with the current view width, so a drag covers the same fraction
    /// of the frame regardless of zoom level.
    pub fn move_x(&mut self, x: f32) {
        let right = self.view_inverse.x_axis.truncate();
        self.target += self.view_width * x * right;
        self.update_view_inverse();
        self.update_proj_view_inverse();
    }

    /// Pan the target along the camera's up axis (see [`Self::move_x`]).
    pub fn move_y(&mut self, y: f32) {
        let up = self.view_inverse.y_axis.truncate();
        self.target += self.view_width * y * up;
        self.update_view_inverse();
        self.update_proj_view_inverse();
    }

    /// Zoom by dividing the view width: `factor > 1` zooms in,
    /// `factor < 1` zooms out. Floored at [`MIN_VIEW_WIDTH`].
    pub fn zoom(&mut self, factor: f32) {
        self.view_width = (self.view_width / factor).max(MIN_VIEW_WIDTH);
        self.update_projection();
        self.update_proj_view_inverse();
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
        self.update_proj_view_inverse();
    }

    pub fn set_view_width(&mut self, view_width: f32) {
        self.view_width = view_width.max(MIN_VIEW_WIDTH);
        self.update_projection();
        self.update_proj_view_inverse();
    }

    /*──────────────────────── matrix upkeep ──────────────────────────*/

    fn update_view_inverse(&mut self) {
        let position = self.target
            + self.radius
                * Vec3::new(
                    self.elevation.cos() * self.azimuth.sin(),
                    self.elevation.sin(),
                    self.elevation.cos() * self.azimuth.cos(),
                );

        // Right-handed look-at basis; the elevation clamp guarantees
        // `direction` is never parallel to world-up.
        let direction = (position - self.target).normalize();
        let right = Vec3::Y.cross(direction).normalize();
        let up = direction.cross(right);

        self.view_inverse = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            direction.extend(0.0),
            position.extend(1.0),
        );
    }

    fn update_projection(&mut self) {
        let view_height = self.view_width / self.aspect;
        self.projection = Mat4::from_cols(
            Vec4::new(2.0 / self.view_width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / view_height, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0 / (self.far - self.near), 0.0),
            Vec4::new(
                0.0,
                0.0,
                -(self.far + self.near) / (self.far - self.near),
                1.0,
            ),
        );
    }

    fn update_proj_view_inverse(&mut self) {
        self.proj_view_inverse = self.view_inverse * self.projection.inverse();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(20.0, 1200.0 / 700.0, 0.0, 1000.0)
    }

    #[test]
    fn elevation_clamps_at_89_degrees() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.add_elevation(0.5);
        }
        assert!(cam.elevation <= MAX_ELEVATION + 1e-6);
        for _ in 0..200 {
            cam.add_elevation(-0.5);
        }
        assert!(cam.elevation >= -MAX_ELEVATION - 1e-6);
    }

    #[test]
    fn azimuth_wraps_into_half_open_range() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.add_azimuth(1.0);
            assert!(cam.azimuth > -PI && cam.azimuth <= PI);
        }
        for _ in 0..100 {
            cam.add_azimuth(-1.7);
            assert!(cam.azimuth > -PI && cam.azimuth <= PI);
        }
    }

    #[test]
    fn radius_and_view_width_respect_floors() {
        let mut cam = camera();
        cam.add_radius(-1e6);
        cam.set_view_width(-3.0);
        assert_eq!(cam.radius, MIN_RADIUS);
        assert_eq!(cam.view_width(), MIN_VIEW_WIDTH);
        // Zooming in forever must not cross the floor either.
        for _ in 0..1000 {
            cam.zoom(2.0);
        }
        assert!(cam.view_width() >= MIN_VIEW_WIDTH);
    }

    #[test]
    fn basis_stays_orthonormal_after_orbiting() {
        let mut cam = camera();
        cam.add_azimuth(2.3);
        cam.add_elevation(-0.9);
        cam.add_radius(-450.0);
        cam.add_azimuth(-5.1);
        cam.add_elevation(1.4);
        cam.move_x(0.25);
        cam.move_y(-0.75);

        let right = cam.view_inverse.x_axis.truncate();
        let up = cam.view_inverse.y_axis.truncate();
        let dir = cam.view_inverse.z_axis.truncate();
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(up).abs() < 1e-5);
        assert!(right.dot(dir).abs() < 1e-5);
        assert!(up.dot(dir).abs() < 1e-5);
        // Right-handed: right × up = direction.
        assert!((right.cross(up) - dir).length() < 1e-5);
    }

    #[test]
    fn position_matches_spherical_formula() {
        let mut cam = camera();
        cam.add_azimuth(0.7);
        cam.add_elevation(0.4);
        cam.add_radius(-100.0);

        let expected = cam.target
            + cam.radius
                * Vec3::new(
                    cam.elevation.cos() * cam.azimuth.sin(),
                    cam.elevation.sin(),
                    cam.elevation.cos() * cam.azimuth.cos(),
                );
        assert!((cam.position() - expected).length() < 1e-4);
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = camera();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 500.0)).length() < 1e-4);
        // NDC origin unprojects onto the view axis.
        let p = cam.proj_view_inverse() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_along_camera_basis() {
        let mut cam = camera();
        let right = cam.view_inverse.x_axis.truncate();
        let before = cam.target;
        cam.move_x(0.5);
        let moved = cam.target - before;
        assert!((moved - right * (0.5 * cam.view_width())).length() < 1e-4);
    }

    #[test]
    fn zoom_in_shrinks_view_width() {
        let mut cam = camera();
        let before = cam.view_width();
        cam.zoom(1.1);
        assert!(cam.view_width() < before);
        cam.zoom(1.0 / 1.1);
        assert!((cam.view_width() - before).abs() < 1e-4);
    }
}
