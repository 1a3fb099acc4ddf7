//! Screen furniture drawn outside the gauge scene.
//!
//! - [`header`]: title bar with link status and FPS
//! - [`popups`]: transient centred notices
//!
//! Both are immediate-mode: they draw straight onto the target each frame,
//! on top of the scene.

mod header;
mod popups;

pub use header::draw_header;
pub use popups::{draw_fps_toggle_popup, draw_link_popup};
