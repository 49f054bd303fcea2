mod camera;
mod ellipsoid;
mod material;

pub use camera::{Camera, MIN_VIEW_WIDTH};
pub use ellipsoid::{Ellipsoid, MIN_AXIS};
pub use material::Material;
