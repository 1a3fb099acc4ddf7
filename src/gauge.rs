//! Tape gauge geometry and threshold rendering.
//!
//! A gauge is a vertical tape that scrolls under a fixed needle. The needle
//! points at the tape's vertical centre, which always represents the current
//! smoothed value `v`; values grow upward.
//!
//! ```text
//!        top ┌──────────┐
//!            │▓▓        │  high warning zone (tiled up from the crossing,
//!            │  ▓▓      │  first box truncated at the top edge)
//!            │▓▓── 40   │  ← high_threshold crossing / danger bar
//!            │   ─      │
//!            │  ── 30   │◀ needle at center_y = value v
//!            │   ─      │
//!            │  ── 20   │
//!            │▓▓        │  low warning zone (tiled down from the crossing,
//!     bottom └──────────┘  last box truncated at the bottom edge)
//! ```
//!
//! # Per-Frame Algorithm
//!
//! [`Gauge::layout`] turns `v` into a [`RenderSet`]:
//!
//! 1. **Ticks**: ten candidates `(floor(v / step) + k) * step` for
//!    `k in -4..=5`. A candidate whose label would be negative is skipped but
//!    keeps its slot. Every second tick carries a label.
//! 2. **Low zone**: when the lower visible bound is below `low_threshold`,
//!    the pixels between the crossing and the bottom edge are tiled with
//!    alternating boxes.
//! 3. **High zone**: the mirror image above `high_threshold`.
//! 4. **Danger bar**: one thin bar on the redline crossing while it lies
//!    within `danger_margin` of the tape, clamped inside the tape.
//!
//! A zone whose pixel range is zero or negative is suppressed entirely.
//!
//! # Coordinates
//!
//! All pixel math is `i32`. Value-to-pixel conversion rounds once, so boxes
//! tile their range exactly: the last low-zone box ends on `bottom` and the
//! first high-zone box starts on `top`, with no overshoot or gap.

use core::fmt::Write;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, Triangle},
};
use heapless::String;

use crate::{
    colors::{CYAN, GRAY, HUD_GREEN, ORANGE, RED, WHITE},
    config::{GaugeConfig, NeedleSide},
    render::Primitive,
    styles::{CENTERED, LEFT_MIDDLE, READOUT_FONT, RIGHT_MIDDLE, TICK_FONT, TITLE_FONT},
};

// =============================================================================
// Layout Constants
// =============================================================================

/// Tick candidates below the floor tick.
const TICKS_BELOW: i64 = 4;

/// Tick candidates above the floor tick.
const TICKS_ABOVE: i64 = 5;

/// Total tick candidates per frame.
pub const TICK_COUNT: usize = (TICKS_BELOW + 1 + TICKS_ABOVE) as usize;

/// Length of a labeled tick in pixels.
const LONG_TICK: i32 = 18;

/// Length of an unlabeled tick in pixels.
const SHORT_TICK: i32 = 9;

/// Gap between a long tick's end and its label.
const LABEL_GAP: i32 = 4;

/// Needle length (tip to base) in pixels.
const NEEDLE_LENGTH: i32 = 22;

/// Half of the needle's base height.
const NEEDLE_HALF_WIDTH: i32 = 9;

/// Gap between the needle base and the readout text.
const READOUT_GAP: i32 = 8;

/// Gauge title sits this far above the tape.
const TITLE_OFFSET: i32 = 12;

// =============================================================================
// Pre-computed Primitive Styles
// =============================================================================

const TICK_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(HUD_GREEN, 2);
const FRAME_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GRAY, 1);
const NEEDLE_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(HUD_GREEN);
const DANGER_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(RED);
const LOW_FILLED: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(CYAN);
const LOW_EMPTY: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(CYAN, 1);
const HIGH_FILLED: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(ORANGE);
const HIGH_EMPTY: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(ORANGE, 1);

// =============================================================================
// Render Set
// =============================================================================

/// One tick mark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Screen y of the tick line.
    pub y: i32,
    /// Scale value at this tick.
    pub value: f32,
    /// `round(value / display_factor)`; never negative.
    pub label: i32,
    /// Whether the label text is drawn (every second tick).
    pub labeled: bool,
}

/// One warning-zone box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneBox {
    pub top: i32,
    pub height: u32,
    pub filled: bool,
}

impl ZoneBox {
    /// First row below the box.
    #[inline]
    pub const fn bottom(&self) -> i32 { self.top + self.height as i32 }
}

/// Everything dynamic a gauge draws for one value.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSet {
    /// Value the set was computed for.
    pub value: f32,
    /// Ticks in candidate order (lowest value first), negative labels skipped.
    pub ticks: Vec<Tick>,
    /// Low zone boxes from the threshold crossing down to the bottom edge.
    pub low_zone: Vec<ZoneBox>,
    /// High zone boxes from the top edge down to the threshold crossing.
    pub high_zone: Vec<ZoneBox>,
    /// Redline marker, already clamped inside the tape.
    pub danger_bar: Option<Rectangle>,
}

impl RenderSet {
    /// Number of tick labels drawn.
    pub fn label_count(&self) -> usize { self.ticks.iter().filter(|t| t.labeled).count() }

    /// Convert to drawable primitives in z-order: tick lines, labels, low
    /// zone, high zone, danger bar.
    pub fn primitives(
        &self,
        gauge: &Gauge,
    ) -> Vec<Primitive> {
        let mut out = Vec::with_capacity(
            self.ticks.len() + self.label_count() + self.low_zone.len() + self.high_zone.len() + 1,
        );
        let inner_x = gauge.inner_x();
        let dir = gauge.inward();

        for tick in &self.ticks {
            let length = if tick.labeled { LONG_TICK } else { SHORT_TICK };
            out.push(Primitive::Line {
                start: Point::new(inner_x, tick.y),
                end: Point::new(inner_x + dir * length, tick.y),
                style: TICK_STYLE,
            });
        }

        let label_align = match gauge.config.needle_side {
            NeedleSide::Right => RIGHT_MIDDLE,
            NeedleSide::Left => LEFT_MIDDLE,
        };
        for tick in self.ticks.iter().filter(|t| t.labeled) {
            let mut text: String<12> = String::new();
            let _ = write!(text, "{}", tick.label);
            out.push(Primitive::text(
                &text,
                Point::new(inner_x + dir * (LONG_TICK + LABEL_GAP), tick.y),
                TICK_FONT,
                HUD_GREEN,
                label_align,
            ));
        }

        let zone_x = gauge.zone_x();
        let zone_width = gauge.config.zone_width;
        for (zone, filled_style, empty_style) in [
            (&self.low_zone, LOW_FILLED, LOW_EMPTY),
            (&self.high_zone, HIGH_FILLED, HIGH_EMPTY),
        ] {
            for zone_box in zone {
                out.push(Primitive::Rect {
                    rect: Rectangle::new(Point::new(zone_x, zone_box.top), Size::new(zone_width, zone_box.height)),
                    style: if zone_box.filled { filled_style } else { empty_style },
                });
            }
        }

        if let Some(rect) = self.danger_bar {
            out.push(Primitive::Rect {
                rect,
                style: DANGER_STYLE,
            });
        }

        out
    }
}

// =============================================================================
// Gauge
// =============================================================================

/// Immutable layout of one tape gauge.
#[derive(Clone, Debug)]
pub struct Gauge {
    config: GaugeConfig,
}

impl Gauge {
    pub const fn new(config: GaugeConfig) -> Self { Self { config } }

    #[inline]
    pub const fn config(&self) -> &GaugeConfig { &self.config }

    /// Upper pixel edge (first tape row).
    #[inline]
    pub const fn top(&self) -> i32 { self.config.y }

    /// Lower pixel edge (first row below the tape).
    #[inline]
    pub const fn bottom(&self) -> i32 { self.config.y + self.config.height as i32 }

    /// Needle row.
    #[inline]
    pub const fn center_y(&self) -> i32 { self.config.y + self.config.height as i32 / 2 }

    /// Screen y of `value` while the tape is centred on `v`.
    #[inline]
    pub fn value_to_y(
        &self,
        value: f32,
        v: f32,
    ) -> i32 {
        self.center_y() - ((value - v) * self.config.px_per_unit).round() as i32
    }

    /// Value range covered by the tape while centred on `v`.
    pub fn visible_range(
        &self,
        v: f32,
    ) -> (f32, f32) {
        let half = (self.config.height / 2) as f32 / self.config.px_per_unit;
        (v - half, v + half)
    }

    /// Tape edge the ticks grow from and the needle points at.
    const fn inner_x(&self) -> i32 {
        match self.config.needle_side {
            NeedleSide::Right => self.config.x + self.config.width as i32,
            NeedleSide::Left => self.config.x,
        }
    }

    /// Horizontal direction from the inner edge into the tape.
    const fn inward(&self) -> i32 {
        match self.config.needle_side {
            NeedleSide::Right => -1,
            NeedleSide::Left => 1,
        }
    }

    /// Left edge of the warning-zone strip, along the tape's outer edge.
    const fn zone_x(&self) -> i32 {
        match self.config.needle_side {
            NeedleSide::Right => self.config.x,
            NeedleSide::Left => self.config.x + self.config.width as i32 - self.config.zone_width as i32,
        }
    }

    /// Compute this frame's dynamic elements for smoothed value `v`.
    pub fn layout(
        &self,
        v: f32,
    ) -> RenderSet {
        RenderSet {
            value: v,
            ticks: self.ticks(v),
            low_zone: self.low_zone(v),
            high_zone: self.high_zone(v),
            danger_bar: self.danger_bar(v),
        }
    }

    fn ticks(
        &self,
        v: f32,
    ) -> Vec<Tick> {
        let step = self.config.tick_step;
        let label_period = 2 * self.config.label_granularity;
        let base = (v / step).floor() as i64;

        let mut ticks = Vec::with_capacity(TICK_COUNT);
        for k in -TICKS_BELOW..=TICKS_ABOVE {
            let value = (base + k) as f32 * step;
            let label = (value / self.config.display_factor).round() as i32;
            // Negative labels are skipped; the slot stays empty
            if label < 0 {
                continue;
            }
            ticks.push(Tick {
                y: self.value_to_y(value, v),
                value,
                label,
                labeled: label % label_period == 0,
            });
        }
        ticks
    }

    fn low_zone(
        &self,
        v: f32,
    ) -> Vec<ZoneBox> {
        let (lower_visible, _) = self.visible_range(v);
        if lower_visible >= self.config.low_threshold {
            return Vec::new();
        }
        let crossing = self.value_to_y(self.config.low_threshold, v).max(self.top());
        tile_down(crossing, self.bottom(), self.config.box_height)
    }

    fn high_zone(
        &self,
        v: f32,
    ) -> Vec<ZoneBox> {
        let (_, upper_visible) = self.visible_range(v);
        if upper_visible <= self.config.high_threshold {
            return Vec::new();
        }
        let crossing = self.value_to_y(self.config.high_threshold, v).min(self.bottom());
        tile_up(self.top(), crossing, self.config.box_height)
    }

    fn danger_bar(
        &self,
        v: f32,
    ) -> Option<Rectangle> {
        let crossing = self.value_to_y(self.config.high_threshold, v);
        let margin = self.config.danger_margin as i32;
        if crossing < self.top() - margin || crossing > self.bottom() + margin {
            return None;
        }
        let bar_height = self.config.danger_bar_height as i32;
        let bar_top = (crossing - bar_height / 2).clamp(self.top(), self.bottom() - bar_height);
        Some(Rectangle::new(
            Point::new(self.config.x, bar_top),
            Size::new(self.config.width, self.config.danger_bar_height),
        ))
    }

    // -------------------------------------------------------------------------
    // Static Primitives
    // -------------------------------------------------------------------------

    /// Tape outline, drawn once behind everything.
    pub fn frame(&self) -> Primitive {
        Primitive::Rect {
            rect: Rectangle::new(
                Point::new(self.config.x, self.top()),
                Size::new(self.config.width, self.config.height),
            ),
            style: FRAME_STYLE,
        }
    }

    /// Gauge title above the tape.
    pub fn title(&self) -> Primitive {
        Primitive::text(
            &self.config.label,
            Point::new(self.config.x + self.config.width as i32 / 2, self.top() - TITLE_OFFSET),
            TITLE_FONT,
            WHITE,
            CENTERED,
        )
    }

    /// Needle outside the inner edge, tip on the centre row.
    pub fn needle(&self) -> Primitive {
        let tip = Point::new(self.inner_x(), self.center_y());
        let base_x = self.inner_x() - self.inward() * NEEDLE_LENGTH;
        Primitive::Triangle {
            triangle: Triangle::new(
                tip,
                Point::new(base_x, self.center_y() - NEEDLE_HALF_WIDTH),
                Point::new(base_x, self.center_y() + NEEDLE_HALF_WIDTH),
            ),
            style: NEEDLE_STYLE,
        }
    }

    /// Live numeric readout beside the needle base.
    pub fn readout(
        &self,
        text: &str,
    ) -> Primitive {
        let x = self.inner_x() - self.inward() * (NEEDLE_LENGTH + READOUT_GAP);
        let align = match self.config.needle_side {
            NeedleSide::Right => LEFT_MIDDLE,
            NeedleSide::Left => RIGHT_MIDDLE,
        };
        Primitive::text(text, Point::new(x, self.center_y()), READOUT_FONT, WHITE, align)
    }
}

// =============================================================================
// Zone Tiling
// =============================================================================

/// Tile `[start, end)` downward from `start` with `box_height` boxes.
///
/// The box touching `start` (the threshold) is filled and fill alternates
/// from there. A final partial box ends exactly on `end`.
fn tile_down(
    start: i32,
    end: i32,
    box_height: u32,
) -> Vec<ZoneBox> {
    let range = end - start;
    if range <= 0 {
        return Vec::new();
    }
    let step = box_height as i32;
    let full = range / step;
    let rest = range % step;

    let mut boxes = Vec::with_capacity((full + 1) as usize);
    for i in 0..full {
        boxes.push(ZoneBox {
            top: start + i * step,
            height: box_height,
            filled: i % 2 == 0,
        });
    }
    if rest > 0 {
        boxes.push(ZoneBox {
            top: start + full * step,
            height: rest as u32,
            filled: full % 2 == 0,
        });
    }
    boxes
}

/// Tile `[start, end)` upward from `end` with `box_height` boxes.
///
/// Boxes are returned top-down. The box touching `end` (the threshold) is
/// filled and fill alternates away from it, so the first returned box is the
/// truncated one starting exactly on `start`.
fn tile_up(
    start: i32,
    end: i32,
    box_height: u32,
) -> Vec<ZoneBox> {
    let range = end - start;
    if range <= 0 {
        return Vec::new();
    }
    let step = box_height as i32;
    let full = range / step;
    let rest = range % step;

    let mut boxes = Vec::with_capacity((full + 1) as usize);
    if rest > 0 {
        boxes.push(ZoneBox {
            top: start,
            height: rest as u32,
            filled: full % 2 == 0,
        });
    }
    // i counts boxes away from the threshold
    for i in (0..full).rev() {
        boxes.push(ZoneBox {
            top: end - (i + 1) * step,
            height: box_height,
            filled: i % 2 == 0,
        });
    }
    boxes
}

// =============================================================================
// Unit Tests
// =============================================================================
