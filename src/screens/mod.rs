//! Screens shown outside the HUD frame loop.
//!
//! - **Connect screen** ([`connecting`]): console-style progress while the
//!   vehicle connection opens; shows the failure before exiting.
//!
//! Screens return early if the window is closed so the application can exit
//! without entering the frame loop.

mod connecting;

pub use connecting::run_connecting_screen;
