//! OBD-II head-up display.
//!
//! Library half of the HUD: everything that can be tested without a window.
//!
//! - [`smoothing`]: moving-average filter for raw readings
//! - [`gauge`]: tape gauge layout, warning zones and danger bar
//! - [`render`]: drawable primitives
//! - [`scene`]: retained primitive store with z-order
//! - [`dashboard`]: per-frame driver tying readings to the scene
//! - [`vehicle`]: vehicle connection trait with live (ELM327) and simulated variants
//! - [`widgets`]: header bar and popups
//! - [`popup`], [`timing`]: popup expiry and FPS counting
//! - [`config`], [`error`]: configuration loading and the crate error type
//! - [`colors`], [`styles`]: color and text-style constants
//!
//! The binary (`src/main.rs`) owns the simulator window, the connect screen
//! and the frame loop.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)] // f32->i32 and u32->i32 pixel math
#![allow(clippy::cast_precision_loss)] // integer->f32 in gauge scaling
#![allow(clippy::cast_possible_wrap)] // u32->i32 for pixel sizes well below i32::MAX
#![allow(clippy::cast_sign_loss)] // i32->u32 where the value is known non-negative

pub mod colors;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gauge;
pub mod popup;
pub mod render;
pub mod scene;
pub mod smoothing;
pub mod styles;
pub mod timing;
pub mod vehicle;
pub mod widgets;

pub use error::{HudError, Result};
