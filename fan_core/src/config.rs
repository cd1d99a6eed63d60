//! Runtime configuration for the controller.
//!
//! These are the structs the control loop consumes. They are separate from the
//! TOML schema in `fan_config`; see `conversions` for the bridge.

use std::time::Duration;

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceCfg {
    /// Input sampling rate; one control cycle per sample.
    pub sample_rate_hz: u32,
    /// Actuator update and diagnostics fire once the cycle counter exceeds this.
    pub update_every: u32,
}

impl Default for CadenceCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 20,
            update_every: 20,
        }
    }
}

impl CadenceCfg {
    /// Fixed delay between cycles.
    pub fn period(&self) -> Duration {
        Duration::from_millis(crate::util::period_ms(self.sample_rate_hz))
    }
}

/// Analog ranges and the dial-to-servo mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingCfg {
    /// Full-scale analog reading; light, dial and threshold live in `[0, analog_max]`.
    pub analog_max: u16,
    /// Dial readings at or below this park the fan.
    pub dial_threshold: u16,
    /// Parked servo position.
    pub pos_min: u8,
    /// Servo position at full dial.
    pub pos_max: u8,
}

impl Default for MappingCfg {
    fn default() -> Self {
        Self {
            analog_max: 1023,
            dial_threshold: 50,
            pos_min: 93,
            pos_max: 180,
        }
    }
}

/// Where the threshold lives in the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCfg {
    /// High byte address; the low byte follows at `address + 1`.
    pub address: u16,
}
