//! Centred popup overlays.
//!
//! A popup is a red box with a 3px white border and one line of centred
//! text. Popups are non-modal: key input keeps working while one is visible.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

use crate::{
    colors::{RED, WHITE},
    dashboard::LinkStatus,
    styles::{CENTER_MIDDLE, TITLE_STYLE_WHITE},
};

/// Popup box size, excluding the border.
const POPUP_SIZE: Size = Size::new(200, 50);

/// White border thickness.
const BORDER: u32 = 3;

const WHITE_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(WHITE);
const RED_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(RED);

/// Draw a bordered popup with `message` centred on `display`.
fn draw_popup<D>(
    display: &mut D,
    message: &str,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let body = Rectangle::with_center(display.bounding_box().center(), POPUP_SIZE);
    body.offset(BORDER as i32).into_styled(WHITE_FILL).draw(display).ok();
    body.into_styled(RED_FILL).draw(display).ok();

    Text::with_text_style(message, body.center(), TITLE_STYLE_WHITE, CENTER_MIDDLE)
        .draw(display)
        .ok();
}

/// "FPS ON" / "FPS OFF" after the toggle key.
pub fn draw_fps_toggle_popup<D>(
    display: &mut D,
    fps_enabled: bool,
) where
    D: DrawTarget<Color = Rgb565>,
{
    draw_popup(display, if fps_enabled { "FPS ON" } else { "FPS OFF" });
}

/// Link degradation notice, e.g. "NO DATA".
pub fn draw_link_popup<D>(
    display: &mut D,
    link: LinkStatus,
) where
    D: DrawTarget<Color = Rgb565>,
{
    draw_popup(display, link.label());
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics_simulator::SimulatorDisplay;

    use super::*;
    use crate::colors::BLACK;

    fn count_color(
        display: &SimulatorDisplay<Rgb565>,
        color: Rgb565,
    ) -> usize {
        display.bounding_box().points().filter(|&p| display.get_pixel(p) == color).count()
    }

    #[test]
    fn test_popup_centered_with_border() {
        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(400, 200));
        draw_fps_toggle_popup(&mut canvas, true);

        let center = Point::new(200, 100);
        assert_ne!(canvas.get_pixel(center), BLACK, "Popup covers the centre");

        // Body spans x 100..300, border 3px outside it
        assert_eq!(canvas.get_pixel(Point::new(98, 100)), WHITE, "Left border");
        assert_eq!(canvas.get_pixel(Point::new(101, 100)), RED, "Body fill");
        assert_eq!(canvas.get_pixel(Point::new(96, 100)), BLACK, "Outside the border");
        assert_eq!(canvas.get_pixel(Point::new(0, 0)), BLACK, "Corners untouched");
    }

    #[test]
    fn test_link_popup_draws_text() {
        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(400, 200));
        draw_link_popup(&mut canvas, LinkStatus::NoLink);

        let border = (206 * 56 - 200 * 50) as usize;
        assert!(count_color(&canvas, WHITE) > border, "Message text adds white pixels inside the body");
    }
}
