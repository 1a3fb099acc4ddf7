//! Synthetic vehicle for bench runs without an adapter.
//!
//! RPM sweeps between idle and redline and holds at the top for a while so
//! the high warning zone and danger bar are visible; speed follows a slower
//! sine. Signals depend only on how many queries have been made, so two
//! instances produce identical sequences.

use super::{Pid, VehicleConnection};

/// Signal time advanced per query.
const TIME_STEP: f32 = 0.025;

/// Idle RPM (bottom of the sweep).
const IDLE_RPM: f32 = 800.0;

/// Top of the RPM sweep, past the default redline.
const PEAK_RPM: f32 = 6800.0;

/// Top of the speed sweep in km/h.
const PEAK_SPEED: f32 = 160.0;

const RPM_FREQ: f32 = 0.06;
const SPEED_FREQ: f32 = 0.025;

/// Deterministic signal source.
#[derive(Debug, Clone)]
pub struct SimulatedConnection {
    /// Signal time parameter.
    t: f32,
    /// Queries answered or dropped so far.
    queries: u64,
    /// Every Nth query returns `None`; 0 disables dropouts.
    dropout_every: u32,
}

impl SimulatedConnection {
    pub const fn new(dropout_every: u32) -> Self {
        Self {
            t: 0.0,
            queries: 0,
            dropout_every,
        }
    }

    fn sample(
        &self,
        pid: Pid,
    ) -> f32 {
        match pid {
            Pid::EngineRpm => held_peak_signal(self.t, IDLE_RPM, PEAK_RPM, RPM_FREQ),
            Pid::VehicleSpeed => sine_signal(self.t, 0.0, PEAK_SPEED, SPEED_FREQ),
        }
    }
}

impl VehicleConnection for SimulatedConnection {
    fn is_connected(&self) -> bool { true }

    fn query(
        &mut self,
        pid: Pid,
    ) -> Option<f32> {
        self.queries += 1;
        self.t += TIME_STEP;
        if self.dropout_every > 0 && self.queries % u64::from(self.dropout_every) == 0 {
            tracing::trace!("Simulated dropout for {}", pid.name());
            return None;
        }
        Some(self.sample(pid))
    }

    fn describe(&self) -> &str { "simulated vehicle" }
}

/// Sinusoid oscillating between `min` and `max`.
fn sine_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// Like [`sine_signal`] but holds at `max` for ~11% of the cycle.
///
/// The hold spans phases 1.2 to 1.9 rad, around the sine peak at pi/2.
fn held_peak_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let cycle = (t * freq) % std::f32::consts::TAU;
    let normalized = if cycle > 1.2 && cycle < 1.9 {
        1.0
    } else {
        cycle.sin().mul_add(0.5, 0.5)
    };
    min + normalized * (max - min)
}

// =============================================================================
// Unit Tests
// =============================================================================
