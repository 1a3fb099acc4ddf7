//! Header bar: title, link status and optional FPS counter.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ LIVE                 OBD HUD                      60 FPS │  26px
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Positions derive from the target's bounding box, so the header follows
//! whatever canvas size the configuration picks.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};
use heapless::String;

use crate::{
    colors::{AMBER, BLACK, RED, WHITE},
    config::HEADER_HEIGHT,
    dashboard::LinkStatus,
    styles::{CENTERED, LABEL_FONT, LABEL_STYLE_WHITE, LEFT_ALIGNED, RIGHT_ALIGNED, TITLE_STYLE_WHITE},
};

/// Horizontal inset of the status and FPS texts.
const EDGE_MARGIN: i32 = 5;

/// Baseline of the title text.
const TITLE_BASELINE: i32 = 19;

/// Baseline of the small status and FPS texts.
const LABEL_BASELINE: i32 = 17;

const HEADER_FILL_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(RED);

/// Status text color on the red bar.
const fn status_color(link: LinkStatus) -> Rgb565 {
    match link {
        LinkStatus::Live => WHITE,
        LinkStatus::NoData => AMBER,
        LinkStatus::NoLink => BLACK,
    }
}

/// Draw the header across the top of `display`.
///
/// `fps` is drawn on the right when `Some`.
pub fn draw_header<D>(
    display: &mut D,
    title: &str,
    link: LinkStatus,
    fps: Option<f32>,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let bounds = display.bounding_box();
    let width = bounds.size.width;
    let left = bounds.top_left.x;
    let right = left + width as i32;

    Rectangle::new(bounds.top_left, Size::new(width, HEADER_HEIGHT))
        .into_styled(HEADER_FILL_STYLE)
        .draw(display)
        .ok();

    Text::with_text_style(
        title,
        Point::new(left + width as i32 / 2, TITLE_BASELINE),
        TITLE_STYLE_WHITE,
        CENTERED,
    )
    .draw(display)
    .ok();

    Text::with_text_style(
        link.label(),
        Point::new(left + EDGE_MARGIN, LABEL_BASELINE),
        MonoTextStyle::new(LABEL_FONT, status_color(link)),
        LEFT_ALIGNED,
    )
    .draw(display)
    .ok();

    if let Some(fps) = fps {
        let mut fps_str: String<16> = String::new();
        let _ = write!(fps_str, "{fps:.0} FPS");
        Text::with_text_style(&fps_str, Point::new(right - EDGE_MARGIN, LABEL_BASELINE), LABEL_STYLE_WHITE, RIGHT_ALIGNED)
            .draw(display)
            .ok();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics_simulator::SimulatorDisplay;

    use super::*;

    const W: u32 = 320;
    const H: u32 = 60;

    fn count_color(
        display: &SimulatorDisplay<Rgb565>,
        color: Rgb565,
    ) -> usize {
        display.bounding_box().points().filter(|&p| display.get_pixel(p) == color).count()
    }

    #[test]
    fn test_header_fills_top_band() {
        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(W, H));
        draw_header(&mut canvas, "OBD HUD", LinkStatus::Live, None);

        assert_eq!(canvas.get_pixel(Point::new(0, 0)), RED, "Top-left corner is header fill");
        assert_eq!(canvas.get_pixel(Point::new(W as i32 - 1, HEADER_HEIGHT as i32 - 1)), RED);
        assert_eq!(canvas.get_pixel(Point::new(0, HEADER_HEIGHT as i32)), BLACK, "Nothing below the header");
        assert!(count_color(&canvas, WHITE) > 0, "Title and status text are drawn");
    }

    #[test]
    fn test_fps_adds_text() {
        let mut without = SimulatorDisplay::<Rgb565>::new(Size::new(W, H));
        draw_header(&mut without, "OBD HUD", LinkStatus::Live, None);
        let mut with = SimulatorDisplay::<Rgb565>::new(Size::new(W, H));
        draw_header(&mut with, "OBD HUD", LinkStatus::Live, Some(59.6));

        assert!(count_color(&with, WHITE) > count_color(&without, WHITE), "FPS text adds white pixels");
    }

    #[test]
    fn test_status_colors() {
        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(W, H));
        draw_header(&mut canvas, "", LinkStatus::NoData, None);
        assert!(count_color(&canvas, AMBER) > 0, "NO DATA is drawn in amber");

        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(W, H));
        draw_header(&mut canvas, "", LinkStatus::NoLink, None);
        assert_eq!(count_color(&canvas, WHITE), 0, "NO LINK is not drawn in white");
    }
}
