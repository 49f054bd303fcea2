use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;

use crate::renderer::CHANNELS;
use crate::scene::{Camera, Ellipsoid, Material, MIN_AXIS, MIN_VIEW_WIDTH};

/// Colour written for rays that miss the surface.
const BACKGROUND: [u8; 3] = [30, 30, 30];

/* fixed frustum of the scene; only the view width is user-adjustable */
const VIEW_WIDTH: f32 = 20.0;
const NEAR_PLANE: f32 = 0.0;
const FAR_PLANE: f32 = 1000.0;

/// Coarsest block is `2^4 = 16` pixels unless overridden via [`Params`].
const DEFAULT_ACCURACY: u32 = 4;
/// `1 << accuracy` must fit in a `u32`.
const MAX_ACCURACY: u32 = 16;

#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("viewport dimensions must be positive (got {width}x{height})")]
    Empty { width: usize, height: usize },
}

/// Flat snapshot of every user-adjustable scene parameter.
///
/// [`Raycaster::params`] returns the current values;
/// [`Raycaster::set_params`] applies a whole patch at once, clamping each
/// field to its documented range and restarting refinement only if
/// something actually changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    /// Refinement accuracy exponent: the coarsest pass uses
    /// `2^accuracy`-pixel blocks.
    pub accuracy: u32,
    /// Orthographic frustum half-extent, `> 0.01`.
    pub view_width: f32,
    /// Ambient coefficient in `[0, 1]`.
    pub ambient: f32,
    /// Diffuse coefficient in `[0, 1]`.
    pub diffuse: f32,
    /// Specular coefficient in `[0, 1]`.
    pub specular: f32,
    /// Specular exponent in `[1, 100]`.
    pub shininess: f32,
    /// Ellipsoid semi-axes, each `≥ 0.1`.
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Params {
    /// Every field forced into its valid range.
    fn clamped(self) -> Self {
        Self {
            accuracy: self.accuracy.min(MAX_ACCURACY),
            view_width: self.view_width.max(MIN_VIEW_WIDTH),
            ambient: self.ambient.clamp(0.0, 1.0),
            diffuse: self.diffuse.clamp(0.0, 1.0),
            specular: self.specular.clamp(0.0, 1.0),
            shininess: self.shininess.clamp(1.0, 100.0),
            a: self.a.max(MIN_AXIS),
            b: self.b.max(MIN_AXIS),
            c: self.c.max(MIN_AXIS),
        }
    }
}

/// Progressive single-surface raycaster.
///
/// Owns the orbit camera, the ellipsoid, and the RGB output buffer. One
/// [`Self::render_pass`] call per display tick keeps the UI responsive:
/// the first pass after any change covers the whole frame with coarse
/// blocks, later passes sharpen it without resampling what the coarser
/// grid already produced.
pub struct Raycaster {
    camera: Camera,
    ellipsoid: Ellipsoid,
    width: usize,
    height: usize,
    accuracy: u32,
    pixel_size: u32,
    buffer: Vec<u8>,
}

impl Raycaster {
    /// Raycaster for a `width × height` viewport with the default scene
    /// (4 × 2 × 8 ellipsoid, yellow material, camera on the +z axis).
    pub fn new(width: usize, height: usize) -> Result<Self, ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::Empty { width, height });
        }
        Ok(Self {
            camera: Camera::new(
                VIEW_WIDTH,
                width as f32 / height as f32,
                NEAR_PLANE,
                FAR_PLANE,
            ),
            ellipsoid: Ellipsoid::new(4.0, 2.0, 8.0),
            width,
            height,
            accuracy: DEFAULT_ACCURACY,
            pixel_size: 1 << DEFAULT_ACCURACY,
            buffer: vec![0; width * height * CHANNELS],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True once the buffer holds the fully refined image.
    pub fn is_refined(&self) -> bool {
        self.pixel_size == 0
    }

    /// Reallocate the buffer for a new viewport and restart refinement.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::Empty { width, height });
        }
        self.width = width;
        self.height = height;
        self.buffer = vec![0; width * height * CHANNELS];
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.refresh();
        Ok(())
    }

    /// Run one refinement pass, if any is pending, and loan the updated
    /// buffer to `submit` as `(rgb_bytes, width, height)`.
    ///
    /// Returns `true` iff a pass ran; `submit` is called exactly once in
    /// that case and not at all otherwise.
    pub fn render_pass<F>(&mut self, submit: F) -> bool
    where
        F: FnOnce(&[u8], usize, usize),
    {
        if self.pixel_size == 0 {
            return false;
        }
        self.draw();
        submit(&self.buffer, self.width, self.height);
        self.pixel_size /= 2;
        true
    }

    /*──────────────────────── parameter surface ──────────────────────*/

    pub fn params(&self) -> Params {
        let material = self.ellipsoid.material();
        Params {
            accuracy: self.accuracy,
            view_width: self.camera.view_width(),
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            shininess: material.shininess,
            a: self.ellipsoid.a(),
            b: self.ellipsoid.b(),
            c: self.ellipsoid.c(),
        }
    }

    /// Apply a parameter patch. Fields are clamped first; if the clamped
    /// patch equals the current state nothing happens, otherwise the
    /// change is applied and refinement restarts from the coarsest pass.
    pub fn set_params(&mut self, patch: Params) {
        let patch = patch.clamped();
        if patch == self.params() {
            return;
        }

        self.accuracy = patch.accuracy;
        self.camera.set_view_width(patch.view_width);
        self.ellipsoid.set_material(Material {
            color: self.ellipsoid.material().color,
            ambient: patch.ambient,
            diffuse: patch.diffuse,
            specular: patch.specular,
            shininess: patch.shininess,
        });
        self.ellipsoid.set_a(patch.a);
        self.ellipsoid.set_b(patch.b);
        self.ellipsoid.set_c(patch.c);
        self.refresh();
    }

    /*──────────────────────── camera deltas ──────────────────────────*/

    pub fn add_elevation(&mut self, delta_rad: f32) {
        self.camera.add_elevation(delta_rad);
        self.refresh();
    }

    pub fn add_azimuth(&mut self, delta_rad: f32) {
        self.camera.add_azimuth(delta_rad);
        self.refresh();
    }

    pub fn add_radius(&mut self, delta: f32) {
        self.camera.add_radius(delta);
        self.refresh();
    }

    pub fn move_x(&mut self, x: f32) {
        self.camera.move_x(x);
        self.refresh();
    }

    pub fn move_y(&mut self, y: f32) {
        self.camera.move_y(y);
        self.refresh();
    }

    /// Zoom in for `factor > 1`, out for `factor < 1`
    /// (see [`Camera::zoom`]).
    pub fn zoom(&mut self, factor: f32) {
        self.camera.zoom(factor);
        self.refresh();
    }

    /*──────────────────────── one refinement pass ────────────────────*/

    fn max_pixel_size(&self) -> u32 {
        1 << self.accuracy
    }

    fn refresh(&mut self) {
        self.pixel_size = self.max_pixel_size();
    }

    fn draw(&mut self) {
        let cam_inv = self.camera.proj_view_inverse();
        // The surface test moves into NDC+depth space once per pass:
        // a point q (NDC) is on the surface iff qᵀ·(Cinvᵀ·Q·Cinv)·q = 0.
        let m = cam_inv.transpose() * self.ellipsoid.matrix() * cam_inv;
        let eye = self.camera.position();
        let material = self.ellipsoid.material();

        let size = self.pixel_size as i32;
        let max_size = self.max_pixel_size() as i32;
        let (w, h) = (self.width as i32, self.height as i32);

        for_each_sample(size, max_size, w, h, |cx, cy| {
            let x = 2.0 * cx as f32 / w as f32 - 1.0;
            let y = 2.0 * cy as f32 / h as f32 - 1.0;
            let color = match intersect(&m, x, y) {
                Some(z) => {
                    let point = (cam_inv * Vec4::new(x, y, z, 1.0)).truncate();
                    shade(&material, self.ellipsoid.normal_at(point), eye)
                }
                None => BACKGROUND,
            };
            self.blit_block(cx, cy, size / 2, color);
        });
    }

    /// Fill the `size × size` block centred at `(cx, cy)` with `color`,
    /// clamped to the buffer bounds. `half == 0` degenerates to a single
    /// pixel.
    fn blit_block(&mut self, cx: i32, cy: i32, half: i32, color: [u8; 3]) {
        let extent = if half != 0 { half } else { 1 };
        let y0 = (cy - half).max(0);
        let y1 = (cy + extent).min(self.height as i32);
        let x0 = (cx - half).max(0);
        let x1 = (cx + extent).min(self.width as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y as usize * self.width + x as usize) * CHANNELS;
                self.buffer[i..i + CHANNELS].copy_from_slice(&color);
            }
        }
    }
}

/*──────────────────────── scheduling ─────────────────────────────────*/

/// Visit every sample centre of the pass with block size `size`.
///
/// The first pass (`size == max_size`) samples the full coarse grid. A
/// refinement pass only samples centres that are *new* on the halved
/// grid: rows carried over from the coarser grid (even step-parity)
/// start offset by `size` and step `2 * size`, skipping the columns the
/// previous pass already computed; interleaved rows take every column.
/// Across a whole refinement cycle each grid position is therefore
/// sampled exactly once.
fn for_each_sample(
    size: i32,
    max_size: i32,
    width: i32,
    height: i32,
    mut f: impl FnMut(i32, i32),
) {
    let half = size / 2;
    let mut row_even = true;
    let mut cy = 0;
    while cy < height + half {
        let (start, step) = if size != max_size && row_even {
            (size, 2 * size)
        } else {
            (0, size)
        };
        let mut cx = start;
        while cx < width + half {
            f(cx, cy);
            cx += step;
        }
        cy += size;
        row_even = !row_even;
    }
}

/*──────────────────────── intersection & shading ─────────────────────*/

/// Depth of the nearest ray-surface intersection for the NDC point
/// `(x, y)`, if any.
///
/// `m = Cinvᵀ·Q·Cinv`; substituting `(x, y, z, 1)` into the quadratic
/// form leaves a quadratic in the depth `z` alone. A non-positive
/// discriminant (tangent rays count as misses) or a root outside the
/// `[-1, 1]` clip range yields `None`.
fn intersect(m: &Mat4, x: f32, y: f32) -> Option<f32> {
    let a = m.z_axis.z;
    let b = (m.z_axis.x + m.x_axis.z) * x
        + (m.z_axis.y + m.y_axis.z) * y
        + m.z_axis.w
        + m.w_axis.z;
    let c = (m.x_axis.x * x + m.x_axis.y * y + m.x_axis.w + m.w_axis.x) * x
        + (m.y_axis.x * x + m.y_axis.y * y + m.y_axis.w + m.w_axis.y) * y
        + m.w_axis.w;

    let delta = b * b - 4.0 * a * c;
    if delta <= 0.0 {
        return None;
    }

    // near root: the surface point closest to the viewer
    let z = (-b - delta.sqrt()) / (2.0 * a);
    if !(-1.0..=1.0).contains(&z) {
        return None;
    }
    Some(z)
}

/// Phong shading with a headlight: the light sits on the camera, and
/// both the light and view vectors are the normalized *eye position*
/// (origin-relative, not point-relative; the original behaviour).
fn shade(material: &Material, normal: Vec3, eye: Vec3) -> [u8; 3] {
    let view = eye.normalize_or_zero();
    let light = view;

    let ambient = material.ambient;

    let light_normal_cos = light.dot(normal);
    let diffuse = material.diffuse * light_normal_cos.max(0.0);

    let reflection = 2.0 * light_normal_cos * normal - light;
    let reflection_view_cos = reflection.dot(view);
    let specular = if reflection_view_cos > 0.0 {
        material.specular * reflection_view_cos.powf(material.shininess)
    } else {
        0.0
    };

    let intensity = ambient + diffuse + specular;
    let mut out = [0u8; 3];
    for (channel, &base) in out.iter_mut().zip(&material.color) {
        *channel = (intensity * base as f32).clamp(0.0, 255.0) as u8;
    }
    out
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn combined_matrix(rc: &Raycaster) -> (Mat4, Mat4) {
        let cam_inv = rc.camera.proj_view_inverse();
        (cam_inv, cam_inv.transpose() * rc.ellipsoid.matrix() * cam_inv)
    }

    #[test]
    fn pass_sizes_halve_then_stop() {
        let mut rc = Raycaster::new(64, 48).unwrap();
        let mut sizes = Vec::new();
        loop {
            let s = rc.pixel_size;
            if !rc.render_pass(|_, _, _| {}) {
                break;
            }
            sizes.push(s);
        }
        assert_eq!(sizes, [16, 8, 4, 2, 1]);
        assert!(rc.is_refined());

        // Once refined, further calls never touch the sink.
        let mut called = false;
        assert!(!rc.render_pass(|_, _, _| called = true));
        assert!(!called);
    }

    #[test]
    fn full_cycle_writes_every_pixel() {
        let mut rc = Raycaster::new(70, 50).unwrap(); // not multiples of 16
        while rc.render_pass(|_, _, _| {}) {}
        // Misses are (30,30,30) and any hit carries at least the ambient
        // term, so an untouched [0,0,0] pixel would be a scheduling hole.
        for px in rc.buffer.chunks_exact(CHANNELS) {
            assert_ne!(px, [0, 0, 0]);
        }
    }

    #[test]
    fn samples_are_never_repeated_across_a_cycle() {
        let (w, h) = (64, 64);
        let max_size = 16;
        let mut seen = HashSet::new();
        let mut in_bounds = 0usize;
        let mut size = max_size;
        while size > 0 {
            for_each_sample(size, max_size, w, h, |cx, cy| {
                assert!(seen.insert((cx, cy)), "({cx},{cy}) sampled twice");
                if cx < w && cy < h {
                    in_bounds += 1;
                }
            });
            size /= 2;
        }
        // Every in-bounds pixel centre is sampled exactly once overall.
        assert_eq!(in_bounds, (w * h) as usize);
    }

    #[test]
    fn centre_ray_hits_surface_point() {
        let rc = Raycaster::new(200, 200).unwrap();
        let (cam_inv, m) = combined_matrix(&rc);

        let z = intersect(&m, 0.0, 0.0).expect("centre ray must hit");
        assert!((-1.0..=1.0).contains(&z));

        // The unprojected hit lies on the implicit surface: pᵀQp ≈ 0.
        let p = cam_inv * Vec4::new(0.0, 0.0, z, 1.0);
        let q = rc.ellipsoid.matrix();
        assert!(p.dot(q * p).abs() < 1e-3);
    }

    #[test]
    fn corner_ray_misses() {
        let rc = Raycaster::new(200, 200).unwrap();
        let (_, m) = combined_matrix(&rc);
        // 4x2x8 ellipsoid in a 20-unit frustum stays well inside NDC ±1.
        assert!(intersect(&m, 1.0, 1.0).is_none());
        assert!(intersect(&m, -1.0, 1.0).is_none());
    }

    #[test]
    fn corner_pixels_get_background_colour() {
        let mut rc = Raycaster::new(96, 96).unwrap();
        while rc.render_pass(|_, _, _| {}) {}
        assert_eq!(&rc.buffer[..CHANNELS], BACKGROUND.as_slice());
        let last = rc.buffer.len() - CHANNELS;
        assert_eq!(&rc.buffer[last..], BACKGROUND.as_slice());
    }

    #[test]
    fn parameter_change_restarts_refinement() {
        let mut rc = Raycaster::new(64, 64).unwrap();
        while rc.render_pass(|_, _, _| {}) {}
        assert!(rc.is_refined());

        rc.set_params(Params {
            ambient: 0.3,
            ..rc.params()
        });
        assert_eq!(rc.pixel_size, 16);
        assert!(rc.render_pass(|_, _, _| {}));
    }

    #[test]
    fn identical_patch_keeps_refinement_progress() {
        let mut rc = Raycaster::new(64, 64).unwrap();
        while rc.render_pass(|_, _, _| {}) {}
        rc.set_params(rc.params());
        assert!(rc.is_refined());
    }

    #[test]
    fn camera_deltas_restart_refinement() {
        let mut rc = Raycaster::new(64, 64).unwrap();
        while rc.render_pass(|_, _, _| {}) {}
        rc.add_azimuth(0.01);
        assert_eq!(rc.pixel_size, 16);
    }

    #[test]
    fn patch_fields_are_clamped() {
        let mut rc = Raycaster::new(64, 64).unwrap();
        rc.set_params(Params {
            view_width: -5.0,
            ambient: 2.0,
            diffuse: -1.0,
            shininess: 1000.0,
            a: 0.0,
            ..rc.params()
        });
        let p = rc.params();
        assert_eq!(p.view_width, MIN_VIEW_WIDTH);
        assert_eq!(p.ambient, 1.0);
        assert_eq!(p.diffuse, 0.0);
        assert_eq!(p.shininess, 100.0);
        assert_eq!(p.a, MIN_AXIS);
    }

    #[test]
    fn oversized_accuracy_is_clamped_before_use() {
        let mut rc = Raycaster::new(64, 64).unwrap();
        rc.set_params(Params {
            accuracy: 40, // would overflow 1u32 << accuracy unclamped
            ..rc.params()
        });
        assert_eq!(rc.params().accuracy, MAX_ACCURACY);
        assert_eq!(rc.pixel_size, 1 << MAX_ACCURACY);
        // the coarse pass still runs and covers the frame
        assert!(rc.render_pass(|_, _, _| {}));
    }

    #[test]
    fn zero_viewport_is_rejected() {
        assert!(Raycaster::new(0, 10).is_err());
        let mut rc = Raycaster::new(10, 10).unwrap();
        assert!(rc.resize(10, 0).is_err());
        // state untouched by the failed resize
        assert_eq!((rc.width(), rc.height()), (10, 10));
    }

    #[test]
    fn headlight_shading_saturates_to_material_colour() {
        // ambient 0.1 + diffuse 0.5 + specular 0.9·1^20 = 1.5 → clamps.
        let material = Material::default();
        assert_eq!(shade(&material, Vec3::Z, Vec3::new(0.0, 0.0, 7.0)), [
            255, 255, 0
        ]);
    }

    #[test]
    fn grazing_shading_keeps_ambient_only() {
        let material = Material::default();
        // Normal perpendicular to the light: diffuse and specular vanish.
        let c = shade(&material, Vec3::X, Vec3::new(0.0, 0.0, 7.0));
        let ambient = (0.1f32 * 255.0) as u8;
        assert_eq!(c, [ambient, ambient, 0]);
    }
}
