//! ---------------------------------------------------------------------------
//! Progressive raycasting core
//!
//! * Owns a CPU-side `width * height * 3` RGB byte buffer.
//! * Each [`Raycaster::render_pass`] call refines the image one step: it
//!   samples a sparse grid of pixel centers, intersects one view ray per
//!   sample with the ellipsoid's quadratic form, Phong-shades the hits,
//!   and blits each colour over an `s × s` pixel block.
//! * The block size `s` starts at `2^accuracy` and halves every pass; a
//!   checkerboard/interlace pattern makes sure no sample position is ever
//!   computed twice within a refinement cycle.
//! * The finished buffer is **loaned** to a sink closure for the duration
//!   of the call — display back-ends upload it and must not keep it.
//!
//! Any camera, material, surface, or accuracy change throws the current
//! refinement away and restarts at the coarsest block size.
//! ---------------------------------------------------------------------------

mod raycaster;

/// Bytes per pixel in the output buffer (RGB, row-major).
pub const CHANNELS: usize = 3;

pub use raycaster::{Params, Raycaster, ViewportError};
