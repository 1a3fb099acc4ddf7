//! Console-style connect screen shown before the HUD starts.
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │      |  Connecting  /              │  Title with spinner
//! │────────────────────────────────────│  Divider line
//! │   Starting OBD HUD...              │
//! │   Opening ELM327 at 192.168...     │  Console output
//! │ > Connected: ELM327 v1.5 at ...    │
//! └────────────────────────────────────┘
//! ```
//!
//! The connection attempt itself blocks for at most the configured timeout;
//! the screen is drawn right before it so the user sees what is happening.

use core::fmt::Write;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use embedded_graphics_simulator::{SimulatorDisplay, SimulatorEvent, Window};
use heapless::String;
use obd_hud::colors::{BLACK, HUD_GREEN, RED};
use obd_hud::config::{ConnectionConfig, ConnectionMode};
use obd_hud::error::Result;
use obd_hud::styles::{CENTERED, LEFT_ALIGNED};
use obd_hud::vehicle::{self, VehicleConnection};

// =============================================================================
// Layout Constants
// =============================================================================

/// Title baseline.
const TITLE_Y: i32 = 25;

/// Divider line height and side margin.
const DIVIDER_Y: i32 = 35;
const MARGIN: i32 = 10;

/// Console text origin and line pitch.
const CONSOLE_START_Y: i32 = 50;
const CONSOLE_LINE_HEIGHT: i32 = 14;

/// Console lines kept before the oldest scrolls off.
const MAX_CONSOLE_LINES: usize = 24;

/// How long the outcome stays on screen.
const SUCCESS_HOLD: Duration = Duration::from_millis(800);
const FAILURE_HOLD: Duration = Duration::from_secs(3);

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

// =============================================================================
// Pre-computed Styles
// =============================================================================

const TITLE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, HUD_GREEN);
const CONSOLE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, HUD_GREEN);
const ERROR_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, RED);
const DIVIDER_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(HUD_GREEN, 1);

type ConsoleLine = String<64>;

/// Scrolling console with spinner title.
struct Console {
    lines: Vec<ConsoleLine>,
    failed: bool,
    spinner_frame: u32,
}

impl Console {
    const fn new() -> Self {
        Self {
            lines: Vec::new(),
            failed: false,
            spinner_frame: 0,
        }
    }

    /// Append a line, truncated to the line capacity.
    fn push(
        &mut self,
        text: &str,
    ) {
        let mut line = ConsoleLine::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        tracing::debug!("connect screen: {text}");
        self.lines.push(line);
        if self.lines.len() > MAX_CONSOLE_LINES {
            self.lines.remove(0);
        }
    }

    fn draw(
        &mut self,
        display: &mut SimulatorDisplay<Rgb565>,
    ) {
        display.clear(BLACK).ok();
        let width = display.size().width as i32;

        // Spinner advances every 8 frames
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        let idx = (self.spinner_frame / 8) as usize % SPINNER.len();
        let mut title: String<32> = String::new();
        if self.failed {
            let _ = title.push_str("Connection failed");
        } else {
            let _ = write!(title, "{}  Connecting  {}", SPINNER[idx], SPINNER[(idx + 2) % SPINNER.len()]);
        }
        Text::with_text_style(&title, Point::new(width / 2, TITLE_Y), TITLE_STYLE, CENTERED)
            .draw(display)
            .ok();

        Line::new(Point::new(MARGIN, DIVIDER_Y), Point::new(width - MARGIN, DIVIDER_Y))
            .into_styled(DIVIDER_STYLE)
            .draw(display)
            .ok();

        let last = self.lines.len().saturating_sub(1);
        for (i, line) in self.lines.iter().enumerate() {
            let y = CONSOLE_START_Y + i as i32 * CONSOLE_LINE_HEIGHT;
            let prefix = if i == last { "> " } else { "  " };
            let style = if self.failed && i == last { ERROR_STYLE } else { CONSOLE_STYLE };
            let mut full: String<68> = String::new();
            let _ = write!(full, "{prefix}{line}");
            Text::with_text_style(&full, Point::new(MARGIN, y), style, LEFT_ALIGNED)
                .draw(display)
                .ok();
        }
    }

    /// Animate for `duration`. Returns `false` if the window was closed.
    fn hold(
        &mut self,
        display: &mut SimulatorDisplay<Rgb565>,
        window: &mut Window,
        duration: Duration,
    ) -> bool {
        let start = Instant::now();
        loop {
            for ev in window.events() {
                if matches!(ev, SimulatorEvent::Quit) {
                    return false;
                }
            }
            self.draw(display);
            window.update(display);
            if start.elapsed() >= duration {
                return true;
            }
            thread::sleep(Duration::from_millis(16));
        }
    }
}

/// Show the connect sequence and open the configured vehicle connection.
///
/// Returns `Ok(None)` if the window is closed, the connection on success,
/// and the connection error after showing it on screen.
pub fn run_connecting_screen(
    display: &mut SimulatorDisplay<Rgb565>,
    window: &mut Window,
    config: &ConnectionConfig,
) -> Result<Option<Box<dyn VehicleConnection>>> {
    let mut console = Console::new();
    console.push("Starting OBD HUD...");
    if !console.hold(display, window, Duration::from_millis(400)) {
        return Ok(None);
    }

    let mut step: String<64> = String::new();
    match config.mode {
        ConnectionMode::Live => {
            let _ = write!(step, "Opening ELM327 at {}...", config.address);
        }
        ConnectionMode::Simulated => {
            let _ = step.push_str("Starting simulated vehicle...");
        }
    }
    console.push(&step);
    console.draw(display);
    window.update(display);

    match vehicle::connect(config) {
        Ok(connection) => {
            let mut done: String<64> = String::new();
            let _ = write!(done, "Connected: {}", connection.describe());
            console.push(&done);
            console.push("Ready.");
            if !console.hold(display, window, SUCCESS_HOLD) {
                return Ok(None);
            }
            Ok(Some(connection))
        }
        Err(e) => {
            tracing::error!("Vehicle connection failed: {e}");
            let mut failed: String<64> = String::new();
            let _ = write!(failed, "{e}");
            console.failed = true;
            console.push(&failed);
            if !console.hold(display, window, FAILURE_HOLD) {
                return Ok(None);
            }
            Err(e)
        }
    }
}
