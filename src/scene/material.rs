/// Phong material of the rendered surface.
///
/// Coefficients are plain weights for the three lighting terms; `color`
/// is the base colour every term is multiplied with. Range clamping is
/// done by the raycaster's parameter patch, not here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base colour, 8-bit per channel RGB.
    pub color: [u8; 3],
    /// Ambient term weight in `[0, 1]`.
    pub ambient: f32,
    /// Diffuse term weight in `[0, 1]`.
    pub diffuse: f32,
    /// Specular term weight in `[0, 1]`.
    pub specular: f32,
    /// Specular exponent in `[1, 100]`.
    pub shininess: f32,
}

impl Default for Material {
    /// Shiny yellow: the scene's out-of-the-box look.
    fn default() -> Self {
        Self {
            color: [255, 255, 0],
            ambient: 0.1,
            diffuse: 0.5,
            specular: 0.9,
            shininess: 20.0,
        }
    }
}
