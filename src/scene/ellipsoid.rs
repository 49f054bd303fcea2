use glam::{Mat4, Vec3, Vec4};

use crate::scene::material::Material;

/// Smallest allowed semi-axis; keeps the quadratic form finite.
pub const MIN_AXIS: f32 = 0.1;

/// Axis-aligned ellipsoid centred at the origin, stored as its three
/// semi-axis lengths.
///
/// A point `p` lies on the surface iff `pᵀ·Q·p = 0` where `Q` is the
/// matrix returned by [`Ellipsoid::matrix`]. The raycaster never needs
/// the axes themselves, only `Q` and the gradient-based normal.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    a: f32,
    b: f32,
    c: f32,
    material: Material,
}

impl Ellipsoid {
    /// New ellipsoid with the default material. Axes are floored at
    /// [`MIN_AXIS`].
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self {
            a: a.max(MIN_AXIS),
            b: b.max(MIN_AXIS),
            c: c.max(MIN_AXIS),
            material: Material::default(),
        }
    }

    /// Quadratic form `Q = diag(1/a², 1/b², 1/c², -1)`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_diagonal(Vec4::new(
            1.0 / (self.a * self.a),
            1.0 / (self.b * self.b),
            1.0 / (self.c * self.c),
            -1.0,
        ))
    }

    /// Outward unit normal at `point`, assumed to be (close to) the
    /// surface. The gradient of the implicit function is
    /// `(2x/a², 2y/b², 2z/c²)`; the factor 2 vanishes in normalization.
    /// Finite garbage in gives finite garbage out, never a panic.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x / (self.a * self.a),
            point.y / (self.b * self.b),
            point.z / (self.c * self.c),
        )
        .normalize_or_zero()
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn a(&self) -> f32 {
        self.a
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    pub fn c(&self) -> f32 {
        self.c
    }

    pub fn set_a(&mut self, a: f32) {
        self.a = a.max(MIN_AXIS);
    }

    pub fn set_b(&mut self, b: f32) {
        self.b = b.max(MIN_AXIS);
    }

    pub fn set_c(&mut self, c: f32) {
        self.c = c.max(MIN_AXIS);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
