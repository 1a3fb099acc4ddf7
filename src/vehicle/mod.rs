//! Vehicle data sources.
//!
//! The dashboard only sees the [`VehicleConnection`] trait. Two variants
//! implement it:
//!
//! - [`LiveConnection`]: an ELM327-compatible adapter reached over TCP
//! - [`SimulatedConnection`]: deterministic synthetic signals for bench use
//!
//! [`connect`] picks the variant from [`ConnectionMode`]; nothing downstream
//! inspects which one it got.
//!
//! # No Data
//!
//! `query` returns `None` whenever a reading is not available this frame:
//! the answer has not arrived yet, the ECU answered `NO DATA`, or the link is
//! down. `None` is never an error; the caller decides how to treat a gap.

mod live;
mod simulated;

pub use live::LiveConnection;
pub use simulated::SimulatedConnection;

use crate::config::{ConnectionConfig, ConnectionMode};
use crate::error::{HudError, Result};

/// OBD-II mode 01 parameters the HUD displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pid {
    /// `0C`: engine speed in RPM.
    EngineRpm,
    /// `0D`: vehicle speed in km/h.
    VehicleSpeed,
}

impl Pid {
    /// Every PID the HUD polls, in polling order.
    pub const ALL: [Self; 2] = [Self::EngineRpm, Self::VehicleSpeed];

    /// Mode 01 PID byte.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::EngineRpm => 0x0C,
            Self::VehicleSpeed => 0x0D,
        }
    }

    /// PID for a mode 01 code, if the HUD polls it.
    pub fn from_code(code: u8) -> Option<Self> { Self::ALL.into_iter().find(|pid| pid.code() == code) }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EngineRpm => "RPM",
            Self::VehicleSpeed => "SPEED",
        }
    }

    /// Decode the data bytes of a `41 xx` answer.
    ///
    /// RPM is `(256 * A + B) / 4`, speed is `A`. Returns `None` if too few
    /// bytes were supplied.
    pub fn decode(
        self,
        data: &[u8],
    ) -> Option<f32> {
        match (self, data) {
            (Self::EngineRpm, [a, b, ..]) => Some((u32::from(*a) * 256 + u32::from(*b)) as f32 / 4.0),
            (Self::VehicleSpeed, [a, ..]) => Some(f32::from(*a)),
            _ => None,
        }
    }
}

/// Source of raw vehicle readings.
pub trait VehicleConnection {
    /// Whether the link to the vehicle is up.
    fn is_connected(&self) -> bool;

    /// Latest reading for `pid`, or `None` if there is nothing new.
    ///
    /// Must not block the frame loop.
    fn query(
        &mut self,
        pid: Pid,
    ) -> Option<f32>;

    /// Short human-readable description for logs and the connect screen.
    fn describe(&self) -> &str;
}

/// Open the configured connection.
///
/// Fails with [`HudError::Connection`] if the link cannot be established or
/// the vehicle does not answer.
pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn VehicleConnection>> {
    let connection: Box<dyn VehicleConnection> = match config.mode {
        ConnectionMode::Live => Box::new(LiveConnection::open(&config.address, config.timeout())?),
        ConnectionMode::Simulated => Box::new(SimulatedConnection::new(config.dropout_every)),
    };

    if !connection.is_connected() {
        return Err(HudError::Connection(format!("{} is not connected", connection.describe())));
    }
    tracing::info!("Connected: {}", connection.describe());
    Ok(connection)
}

// =============================================================================
// Unit Tests
// =============================================================================
