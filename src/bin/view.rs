//! Interactive viewer for the progressive ellipsoid raycaster.
//!
//! ```bash
//! cargo run --release -- [--width 1200] [--height 700] [--accuracy 4]
//! ```
//!
//! Controls:
//! * left/middle drag orbits; with Shift held it pans
//! * right drag or scroll wheel zooms
//! * parameter stepping (Shift reverses the step):
//!   `E` accuracy, `V` view width, `A` ambient, `D` diffuse,
//!   `S` specular, `H` shininess, `X`/`Y`/`Z` ellipsoid semi-axes
//! * `Esc` quits

use clap::Parser;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::time::{Duration, Instant};

use ellipsoid_rs::renderer::{Params, Raycaster};

/* drag sensitivities, per pixel of mouse travel */
const ORBIT_SENSITIVITY: f32 = 0.002;
const PAN_SENSITIVITY: f32 = 0.001;
const DRAG_ZOOM_BASE: f32 = 1.005;
const SCROLL_ZOOM_BASE: f32 = 1.1;

#[derive(Parser)]
#[command(about = "Progressive ellipsoid raycaster viewer")]
struct Args {
    /// Initial window width in pixels.
    #[arg(long, default_value_t = 1200)]
    width: usize,

    /// Initial window height in pixels.
    #[arg(long, default_value_t = 700)]
    height: usize,

    /// Refinement accuracy exponent: the coarsest pass uses 2^N blocks.
    #[arg(long, default_value_t = 4)]
    accuracy: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut caster = Raycaster::new(args.width, args.height)?;
    caster.set_params(Params {
        accuracy: args.accuracy,
        ..caster.params()
    });
    // read the exponent back: set_params clamps it
    log::info!(
        "viewport {}x{}, coarsest block {} px",
        args.width,
        args.height,
        1u32 << caster.params().accuracy
    );

    let mut window = Window::new(
        "ellipsoid raycasting",
        args.width,
        args.height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    // 0x00RRGGBB staging buffer for minifb; refreshed only when a
    // refinement pass actually ran.
    let mut display = vec![0u32; args.width * args.height];
    let mut prev_mouse: Option<(f32, f32)> = None;

    // ────────────────── benchmarking state ──────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated pass time
    let mut acc_passes = 0usize;
    let mut last_print = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        /* window resize: poll, since minifb has no resize callback */
        let (w, h) = window.get_size();
        if w > 0 && h > 0 && (w, h) != (caster.width(), caster.height()) {
            caster.resize(w, h)?;
            display.resize(w * h, 0);
            log::info!("resized to {w}x{h}");
        }

        handle_mouse(&window, &mut caster, &mut prev_mouse);
        handle_keys(&window, &mut caster);

        /* at most one refinement pass per display frame */
        let t0 = Instant::now();
        let ran = caster.render_pass(|fb, _, _| {
            for (dst, src) in display.iter_mut().zip(fb.chunks_exact(3)) {
                *dst = u32::from_be_bytes([0, src[0], src[1], src[2]]);
            }
        });
        if ran {
            acc_time += t0.elapsed();
            acc_passes += 1;
        }

        window.update_with_buffer(&display, caster.width(), caster.height())?;

        // ─────────── report pass timing every ~3 s ──────────────────
        if acc_passes > 0 && last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_passes as f64;
            log::info!("avg pass: {avg_ms:.2} ms over {acc_passes} passes");
            acc_time = Duration::ZERO;
            acc_passes = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// Map mouse drags and the scroll wheel onto camera deltas.
fn handle_mouse(window: &Window, caster: &mut Raycaster, prev: &mut Option<(f32, f32)>) {
    let Some(pos) = window.get_mouse_pos(MouseMode::Pass) else {
        *prev = None;
        return;
    };
    let (dx, dy) = match *prev {
        Some((px, py)) => (pos.0 - px, pos.1 - py),
        None => (0.0, 0.0),
    };
    *prev = Some(pos);

    let shift = window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift);
    let dragging =
        window.get_mouse_down(MouseButton::Left) || window.get_mouse_down(MouseButton::Middle);

    if dragging && (dx != 0.0 || dy != 0.0) {
        if shift {
            caster.move_x(-PAN_SENSITIVITY * dx);
            caster.move_y(PAN_SENSITIVITY * dy);
        } else {
            caster.add_azimuth(-ORBIT_SENSITIVITY * dx);
            caster.add_elevation(ORBIT_SENSITIVITY * dy);
        }
    }

    // dragging up (dy < 0) zooms in
    if window.get_mouse_down(MouseButton::Right) && dy != 0.0 {
        caster.zoom(DRAG_ZOOM_BASE.powf(-dy));
    }

    // scrolling up zooms in
    if let Some((_, scroll_y)) = window.get_scroll_wheel() {
        if scroll_y != 0.0 {
            caster.zoom(SCROLL_ZOOM_BASE.powf(scroll_y));
        }
    }
}

/// Step one scene parameter per keypress; Shift reverses the step.
/// Step sizes and ranges match the parameter docs on [`Params`]; the
/// raycaster clamps, so no validation happens here.
fn handle_keys(window: &Window, caster: &mut Raycaster) {
    let shift = window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift);
    let sign: f32 = if shift { -1.0 } else { 1.0 };
    let pressed = |key| window.is_key_pressed(key, KeyRepeat::Yes);

    let mut p = caster.params();
    let before = p;

    if pressed(Key::E) {
        p.accuracy = if shift {
            p.accuracy.saturating_sub(1)
        } else {
            p.accuracy + 1
        };
    }
    if pressed(Key::V) {
        p.view_width += 0.1 * sign;
    }
    if pressed(Key::A) {
        p.ambient += 0.01 * sign;
    }
    if pressed(Key::D) {
        p.diffuse += 0.01 * sign;
    }
    if pressed(Key::S) {
        p.specular += 0.01 * sign;
    }
    if pressed(Key::H) {
        p.shininess += 0.1 * sign;
    }
    if pressed(Key::X) {
        p.a += 0.1 * sign;
    }
    if pressed(Key::Y) {
        p.b += 0.1 * sign;
    }
    if pressed(Key::Z) {
        p.c += 0.1 * sign;
    }

    if p != before {
        caster.set_params(p);
        log::info!("params: {:?}", caster.params());
    }
}
