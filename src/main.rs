// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)] // main() is long but linear

//! OBD-II head-up display in a simulator window.
//!
//! Shows engine RPM and vehicle speed as two vertical tape gauges that
//! scroll under fixed needles, with alternating warning zones below the low
//! and above the high threshold and a red bar on the redline.
//!
//! # Startup
//!
//! 1. Logging (`RUST_LOG`, default `info`)
//! 2. Configuration from `$OBD_HUD_CONFIG` or the XDG config directory
//! 3. Connect screen; a failed connection is shown, logged and fatal
//! 4. Frame loop
//!
//! # Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `F` | Toggle FPS display |
//! | `Esc` / `Q` | Quit |
//!
//! Key repeat is ignored to prevent toggle spam when holding keys.
//!
//! # Layout (800x480 default)
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ LIVE                    OBD HUD                   60 FPS │  26px
//! ├──────────────────────────────────────────────────────────┤
//! │        RPM x100                            KM/H          │
//! │   ┌────────┐                           ┌────────┐        │
//! │   │▓▓    ─ │                           │ ─    ▓▓│        │
//! │   │   ── 30│◀ 3120               64 ▶ │60 ──   │        │
//! │   │      ─ │                           │ ─      │        │
//! │   └────────┘                           └────────┘        │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod screens;

use std::thread;
use std::time::Instant;

use anyhow::Context;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use obd_hud::colors::BLACK;
use obd_hud::config;
use obd_hud::dashboard::{Dashboard, LinkStatus};
use obd_hud::popup::Popup;
use obd_hud::timing::FpsCounter;
use obd_hud::widgets::{draw_fps_toggle_popup, draw_header, draw_link_popup};
use screens::run_connecting_screen;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = config::default_path();
    let config = config::load(&config_path).with_context(|| format!("loading {}", config_path.display()))?;

    // Initialize display and window
    let mut display: SimulatorDisplay<Rgb565> =
        SimulatorDisplay::new(Size::new(config.display.width, config.display.height));
    let output_settings = OutputSettingsBuilder::new().scale(config.display.scale).build();
    let mut window = Window::new(&config.display.title, &output_settings);

    display.clear(BLACK).ok();
    window.update(&display);

    // Connection failure is fatal; the connect screen already showed and logged it
    let Some(connection) = run_connecting_screen(&mut display, &mut window, &config.connection)
        .context("cannot start without a vehicle connection")?
    else {
        return Ok(());
    };

    // ==========================================================================
    // Frame Loop State
    // ==========================================================================

    let mut dashboard = Dashboard::new(&config, connection);
    let frame_interval = config.display.frame_interval();
    let mut show_fps = config.display.show_fps;
    let mut fps = FpsCounter::new();

    // Active popup (only one at a time, most recent wins)
    let mut active_popup: Option<Popup> = None;

    info!(
        "HUD running on {} ({}x{}, {:?} per frame)",
        dashboard.connection().describe(),
        config.display.width,
        config.display.height,
        frame_interval
    );

    // ==========================================================================
    // Frame Loop
    // ==========================================================================

    'frames: loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => break 'frames,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::Q => break 'frames,
                        // Matched by name: the constant is spelled differently across sdl2 releases
                        other if other.name() == "Escape" => break 'frames,
                        Keycode::F => {
                            show_fps = !show_fps;
                            active_popup = Some(Popup::Fps(Instant::now()));
                            info!("FPS display {}", if show_fps { "on" } else { "off" });
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if active_popup.is_some_and(|popup| popup.is_expired()) {
            active_popup = None;
        }

        // Sample, smooth, rebuild the gauges
        let report = dashboard.tick();
        if report.link_changed && report.link != LinkStatus::Live {
            active_popup = Some(Popup::LinkLost(Instant::now()));
        }

        display.clear(BLACK).ok();
        dashboard.draw(&mut display);
        draw_header(&mut display, &config.display.title, report.link, show_fps.then_some(fps.fps()));

        // Popup last so it sits on top of everything
        match active_popup {
            Some(Popup::Fps(_)) => draw_fps_toggle_popup(&mut display, show_fps),
            Some(Popup::LinkLost(_)) => draw_link_popup(&mut display, report.link),
            None => {}
        }

        window.update(&display);
        fps.frame();

        // Sleep off the rest of the frame interval
        if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    info!("HUD closed after {} frames", dashboard.frames());
    Ok(())
}
