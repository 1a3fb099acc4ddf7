//! Pre-computed static text styles to avoid per-frame object construction.
//!
//! `MonoTextStyle::new` and `TextStyleBuilder` are const fn in
//! embedded-graphics 0.8, so every fixed style lives here as a `const`.
//! Styles whose color varies (tick labels, readouts) expose the font instead
//! so callers build `MonoTextStyle::new(FONT, color)` with only the color
//! changing.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::{PROFONT_12_POINT, PROFONT_24_POINT};

use crate::colors::WHITE;

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Centered text alignment. Used for gauge and header titles.
pub const CENTERED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Center).build();

/// Left-aligned text. Used for console output on the connect screen.
pub const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).build();

/// Right-aligned text. Used for the FPS counter in the header.
pub const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Right).build();

/// Left-aligned, vertically centred on the anchor point. Tick labels and
/// readouts are anchored on a tick line or the needle tip.
pub const LEFT_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Middle)
    .build();

/// Centred both ways on the anchor point. Used for popup messages.
pub const CENTER_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Right-aligned counterpart of [`LEFT_MIDDLE`].
pub const RIGHT_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Font References (for dynamic color styles)
// =============================================================================

/// Small label font (6x10 pixels).
pub const LABEL_FONT: &MonoFont = &FONT_6X10;

/// Tick label font (`ProFont` 12pt).
pub const TICK_FONT: &MonoFont = &PROFONT_12_POINT;

/// Live readout font (`ProFont` 24pt).
pub const READOUT_FONT: &MonoFont = &PROFONT_24_POINT;

/// Gauge title and popup font (10x20 pixels).
pub const TITLE_FONT: &MonoFont = &FONT_10X20;

// =============================================================================
// Pre-computed Text Styles
// =============================================================================

/// Small white text for header status and FPS.
pub const LABEL_STYLE_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, WHITE);

/// Medium white text for the header title and popups.
pub const TITLE_STYLE_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, WHITE);
