//! Progressive ellipsoid raycaster.
//!
//! The scene is a single implicit surface (an ellipsoid given by its
//! quadratic form) intersected analytically with one view ray per pixel.
//! Rather than tracing every pixel each frame, the [`renderer::Raycaster`]
//! refines the image over several frames: it starts with coarse pixel
//! blocks and halves the block size on every render call until the image
//! is sharp, so camera drags stay responsive at any resolution.
//!
//! * [`scene`]: orbit camera, ellipsoid, material (the *what*).
//! * [`renderer`]: the progressive raycasting core (the *how*).
//!
//! Window, input, and display plumbing live in `src/bin/view.rs`; the
//! library itself never touches a window handle.

pub mod renderer;
pub mod scene;
