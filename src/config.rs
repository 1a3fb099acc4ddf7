//! Application configuration.
//!
//! Module constants hold the defaults; everything that varies between installs
//! lives in [`HudConfig`], loaded once from TOML at startup and passed by
//! reference into the components that need it. Nothing reads configuration
//! from globals after construction.
//!
//! # File Location
//!
//! 1. `$OBD_HUD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/obd-hud/obd-hud.toml`
//! 3. `~/.config/obd-hud/obd-hud.toml`
//!
//! A missing file is not an error: the defaults below describe a complete
//! 800x480 layout driven by the simulated vehicle.
//!
//! # Example
//!
//! ```toml
//! [display]
//! scale = 2
//! show_fps = false
//!
//! [connection]
//! mode = "live"
//! address = "192.168.0.10:35000"
//!
//! [smoothing]
//! rpm_window = 12
//! ```
//!
//! `[display]`, `[connection]` and `[smoothing]` may be partial. A gauge
//! table (`[rpm_gauge]`, `[speed_gauge]`) replaces the whole default gauge,
//! so when present it must list every field.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HudError, Result};

// =============================================================================
// Display Defaults
// =============================================================================

/// Default canvas width in pixels.
pub const SCREEN_WIDTH: u32 = 800;

/// Default canvas height in pixels.
pub const SCREEN_HEIGHT: u32 = 480;

/// Header bar height in pixels.
pub const HEADER_HEIGHT: u32 = 26;

/// Default frame interval (~60 FPS).
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Duration that popups remain visible on screen.
pub const POPUP_DURATION: Duration = Duration::from_secs(2);

// =============================================================================
// Data Defaults
// =============================================================================

/// Samples averaged for the RPM needle.
pub const RPM_WINDOW: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Samples averaged for the speed needle.
pub const SPEED_WINDOW: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Consecutive missed reads before a gauge counts as stale (~0.5 s at 60 FPS).
pub const STALE_READ_LIMIT: u32 = 30;

/// Default ELM327 Wi-Fi adapter endpoint.
pub const ADAPTER_ADDRESS: &str = "192.168.0.10:35000";

/// Default adapter handshake/connect timeout.
pub const ADAPTER_TIMEOUT_MS: u64 = 2000;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Root configuration parsed from `obd-hud.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub display: DisplayConfig,
    pub connection: ConnectionConfig,
    pub smoothing: SmoothingConfig,
    pub rpm_gauge: GaugeConfig,
    pub speed_gauge: GaugeConfig,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            connection: ConnectionConfig::default(),
            smoothing: SmoothingConfig::default(),
            rpm_gauge: GaugeConfig::rpm(),
            speed_gauge: GaugeConfig::speed(),
        }
    }
}

/// Window and frame pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Simulator pixel scale.
    pub scale: u32,
    pub frame_interval_ms: u64,
    pub title: String,
    /// FPS counter visible at startup (toggled with `F`).
    pub show_fps: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            scale: 1,
            frame_interval_ms: FRAME_INTERVAL_MS,
            title: "OBD HUD".to_string(),
            show_fps: true,
        }
    }
}

impl DisplayConfig {
    #[inline]
    pub const fn frame_interval(&self) -> Duration { Duration::from_millis(self.frame_interval_ms) }
}

/// Which vehicle connection variant to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// ELM327 adapter reached over TCP.
    Live,
    /// Synthetic signals, no hardware.
    #[default]
    Simulated,
}

/// Vehicle connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub mode: ConnectionMode,
    /// `host:port` of the adapter (live mode).
    pub address: String,
    /// Connect and handshake timeout (live mode).
    pub timeout_ms: u64,
    /// Simulated mode: every Nth query returns no data. 0 disables dropouts.
    pub dropout_every: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::default(),
            address: ADAPTER_ADDRESS.to_string(),
            timeout_ms: ADAPTER_TIMEOUT_MS,
            dropout_every: 0,
        }
    }
}

impl ConnectionConfig {
    #[inline]
    pub const fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

/// Moving-average window sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub rpm_window: NonZeroUsize,
    pub speed_window: NonZeroUsize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            rpm_window: RPM_WINDOW,
            speed_window: SPEED_WINDOW,
        }
    }
}

/// Side of the tape the needle sits on (the tape's inner edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedleSide {
    Left,
    Right,
}

/// Layout and thresholds of one tape gauge.
///
/// The tape occupies `(x, y)` to `(x + width, y + height)`. Values grow
/// upward; the needle points at the vertical centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Title drawn above the tape.
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    /// Fixed pixel extent of the tape.
    pub height: u32,
    /// Pixels per value unit.
    pub px_per_unit: f32,
    /// Value units between ticks.
    pub tick_step: f32,
    /// Tick labels show `round(value / display_factor)`.
    pub display_factor: f32,
    /// Label spacing unit; a tick is labeled when `label % (2 * granularity) == 0`.
    pub label_granularity: i32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Warning-zone box height in pixels.
    pub box_height: u32,
    /// Warning-zone strip width in pixels.
    pub zone_width: u32,
    /// Distance outside the tape at which the redline crossing still shows the danger bar.
    pub danger_margin: u32,
    pub danger_bar_height: u32,
    pub needle_side: NeedleSide,
}

impl GaugeConfig {
    /// Engine RPM tape, left of centre. Labels in hundreds, one per 1000 RPM.
    pub fn rpm() -> Self {
        Self {
            label: "RPM x100".to_string(),
            x: 80,
            y: 60,
            width: 120,
            height: 360,
            px_per_unit: 0.072,
            tick_step: 500.0,
            display_factor: 100.0,
            label_granularity: 5,
            low_threshold: 700.0,
            high_threshold: 6500.0,
            box_height: 12,
            zone_width: 14,
            danger_margin: 24,
            danger_bar_height: 6,
            needle_side: NeedleSide::Right,
        }
    }

    /// Vehicle speed tape (km/h), right of centre. One label per 20 km/h.
    pub fn speed() -> Self {
        Self {
            label: "KM/H".to_string(),
            x: 600,
            y: 60,
            width: 120,
            height: 360,
            px_per_unit: 3.6,
            tick_step: 10.0,
            display_factor: 1.0,
            label_granularity: 10,
            low_threshold: 0.0,
            high_threshold: 130.0,
            box_height: 12,
            zone_width: 14,
            danger_margin: 24,
            danger_bar_height: 6,
            needle_side: NeedleSide::Left,
        }
    }

    fn validate(&self) -> Result<()> {
        let name = &self.label;
        let positive = [
            ("px_per_unit", self.px_per_unit),
            ("tick_step", self.tick_step),
            ("display_factor", self.display_factor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(HudError::Config(format!("gauge '{name}': {field} must be > 0, got {value}")));
            }
        }
        if self.label_granularity <= 0 {
            return Err(HudError::Config(format!("gauge '{name}': label_granularity must be > 0")));
        }
        if self.box_height == 0 || self.height == 0 || self.width == 0 {
            return Err(HudError::Config(format!(
                "gauge '{name}': width, height and box_height must be > 0"
            )));
        }
        for (field, value) in [("low_threshold", self.low_threshold), ("high_threshold", self.high_threshold)] {
            if !value.is_finite() {
                return Err(HudError::Config(format!("gauge '{name}': {field} must be finite, got {value}")));
            }
        }
        if self.low_threshold >= self.high_threshold {
            return Err(HudError::Config(format!(
                "gauge '{name}': low_threshold {} must be below high_threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.danger_bar_height > self.height {
            return Err(HudError::Config(format!(
                "gauge '{name}': danger_bar_height exceeds gauge height"
            )));
        }
        Ok(())
    }
}

impl HudConfig {
    /// Reject values the renderer cannot lay out.
    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 || self.display.scale == 0 {
            return Err(HudError::Config("display width, height and scale must be > 0".to_string()));
        }
        if self.display.frame_interval_ms == 0 {
            return Err(HudError::Config("display.frame_interval_ms must be > 0".to_string()));
        }
        if self.connection.timeout_ms == 0 {
            return Err(HudError::Config("connection.timeout_ms must be > 0".to_string()));
        }
        self.rpm_gauge.validate()?;
        self.speed_gauge.validate()
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<HudConfig> {
    let config: HudConfig = toml::from_str(raw).map_err(|e| HudError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file. Returns `HudConfig::default()` if
/// the file doesn't exist so the HUD always starts with a usable layout.
pub fn load(path: impl AsRef<Path>) -> Result<HudConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!("Config file not found at '{}'; using defaults.", path.display());
        return Ok(HudConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| HudError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config = parse(&raw)?;
    tracing::info!("Loaded config from '{}'", path.display());
    Ok(config)
}

/// Return the config path, honouring `$OBD_HUD_CONFIG` and `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    if let Ok(explicit) = std::env::var("OBD_HUD_CONFIG") {
        return PathBuf::from(explicit);
    }
    let base = std::env::var("XDG_CONFIG_HOME").map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config")
    });
    base.join("obd-hud").join("obd-hud.toml")
}

// =============================================================================
// Unit Tests
// =============================================================================
