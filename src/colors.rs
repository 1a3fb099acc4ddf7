//! Color constants for the HUD.
//!
//! The HUD draws on a black canvas (transparent when projected onto a
//! windshield combiner), so every foreground color is bright and saturated.
//! Standard colors come from the `RgbColor` trait constants; the rest are
//! hand-picked RGB565 values.
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Canvas background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Readouts and popup text.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red. Danger bar, header, link-lost popup.
pub const RED: Rgb565 = Rgb565::RED;

/// Pure cyan. Low-threshold warning zone.
pub const CYAN: Rgb565 = Rgb565::CYAN;

// =============================================================================
// Custom Colors
// =============================================================================

/// Classic HUD phosphor green. Ticks, labels and needles.
/// RGB565: (4, 63, 8).
pub const HUD_GREEN: Rgb565 = Rgb565::new(4, 63, 8);

/// Orange. High-threshold warning zone.
/// RGB565: (31, 32, 0) - slightly darker than yellow.
pub const ORANGE: Rgb565 = Rgb565::new(31, 32, 0);

/// Dark gray for tape frames. Subtle enough to not distract from data.
/// RGB565: (8, 16, 8) - roughly 25% brightness.
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);

/// Yellow status text for degraded link states.
pub const AMBER: Rgb565 = Rgb565::new(31, 48, 0);
