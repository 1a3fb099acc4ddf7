//! Drawable primitives for the HUD scene.
//!
//! A [`Primitive`] is one retained drawing command: a line, a rectangle, a
//! triangle or a short text. Gauges describe each frame as a list of
//! primitives, the [`Scene`](crate::scene::Scene) keeps them in z-order, and
//! [`Primitive::draw`] renders them onto any `DrawTarget<Color = Rgb565>`
//! (the simulator window in the binary, an off-screen `SimulatorDisplay` in
//! tests).
//!
//! # Text Storage
//!
//! Text lives in a `heapless::String<TEXT_CAPACITY>`. Every HUD string (tick
//! labels, readouts, gauge titles) fits; longer input is truncated at a
//! character boundary rather than rejected.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Line, Primitive as _, PrimitiveStyle, Rectangle, Triangle},
    text::{Text, TextStyle},
};
use heapless::String;

/// Maximum characters stored in a text primitive.
pub const TEXT_CAPACITY: usize = 16;

/// One retained drawing command.
#[derive(Clone, Debug)]
pub enum Primitive {
    Line {
        start: Point,
        end: Point,
        style: PrimitiveStyle<Rgb565>,
    },
    Rect {
        rect: Rectangle,
        style: PrimitiveStyle<Rgb565>,
    },
    Triangle {
        triangle: Triangle,
        style: PrimitiveStyle<Rgb565>,
    },
    Text {
        text: String<TEXT_CAPACITY>,
        position: Point,
        font: &'static MonoFont<'static>,
        color: Rgb565,
        align: TextStyle,
    },
}

impl Primitive {
    /// Build a text primitive, truncating to [`TEXT_CAPACITY`] characters.
    pub fn text(
        content: &str,
        position: Point,
        font: &'static MonoFont<'static>,
        color: Rgb565,
        align: TextStyle,
    ) -> Self {
        Self::Text {
            text: truncated(content),
            position,
            font,
            color,
            align,
        }
    }

    /// Replace the content of a text primitive.
    ///
    /// Returns `false` (and changes nothing) for non-text primitives.
    pub fn set_text(
        &mut self,
        content: &str,
    ) -> bool {
        match self {
            Self::Text { text, .. } => {
                *text = truncated(content);
                true
            }
            _ => false,
        }
    }

    /// Text content, if this is a text primitive.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Draw onto any RGB565 target. Draw errors are ignored, as a failed
    /// primitive must not abort the rest of the frame.
    pub fn draw<D>(
        &self,
        target: &mut D,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        match self {
            Self::Line { start, end, style } => {
                Line::new(*start, *end).into_styled(*style).draw(target).ok();
            }
            Self::Rect { rect, style } => {
                rect.into_styled(*style).draw(target).ok();
            }
            Self::Triangle { triangle, style } => {
                triangle.into_styled(*style).draw(target).ok();
            }
            Self::Text {
                text,
                position,
                font,
                color,
                align,
            } => {
                Text::with_text_style(text, *position, MonoTextStyle::new(*font, *color), *align)
                    .draw(target)
                    .ok();
            }
        }
    }
}

/// Copy as many whole characters as fit.
fn truncated(content: &str) -> String<TEXT_CAPACITY> {
    let mut text = String::new();
    for c in content.chars() {
        if text.push(c).is_err() {
            break;
        }
    }
    text
}

// =============================================================================
// Unit Tests
// =============================================================================
