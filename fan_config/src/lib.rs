#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the fan controller.
//!
//! - `Config` and its sections are deserialized from TOML; every section has
//!   defaults so an empty file is a valid (simulation) configuration.
//! - `Config::validate()` rejects values the control loop cannot honor.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Wiring for the Raspberry Pi backend. Ignored by the simulator.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// BCM GPIO of the calibration button (active high)
    pub button: u8,
    /// MCP3008 channel wired to the light sensor divider
    pub light_channel: u8,
    /// MCP3008 channel wired to the dial potentiometer
    pub dial_channel: u8,
    /// Hardware PWM channel (0 or 1) driving the servo
    pub servo_pwm: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            button: 17,
            light_channel: 0,
            dial_channel: 1,
            servo_pwm: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cadence {
    /// Input sampling rate; the cycle period is 1000 / hz milliseconds.
    pub sample_rate_hz: u32,
    /// Cycles between actuator updates. Defaults to `sample_rate_hz` (~1 Hz).
    pub update_every: Option<u32>,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            sample_rate_hz: 20,
            update_every: None,
        }
    }
}

impl Cadence {
    /// Effective update interval in cycles.
    pub fn update_every(&self) -> u32 {
        self.update_every.unwrap_or(self.sample_rate_hz)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Mapping {
    /// Full-scale analog reading (10-bit converters: 1023)
    pub analog_max: u16,
    /// Dial readings at or below this value park the fan
    pub dial_threshold: u16,
    /// Servo angle for the parked/off position
    pub pos_min: u8,
    /// Servo angle at full dial
    pub pos_max: u8,
}

impl Default for Mapping {
    fn default() -> Self {
        Self {
            analog_max: 1023,
            dial_threshold: 50,
            pos_min: 93,
            pos_max: 180,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Store {
    /// Address of the high byte; the low byte lives at `address + 1`.
    pub address: u16,
    /// Backing file for the byte image used on hosts without EEPROM.
    pub path: PathBuf,
    /// Size of the byte image in bytes.
    pub size: u16,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            address: 0,
            path: PathBuf::from("fan_threshold.bin"),
            size: 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Diagnostics {
    /// Emit a snapshot line every actuator update
    pub enabled: bool,
    /// Also append snapshot lines to this file
    pub file: Option<PathBuf>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub cadence: Cadence,
    pub mapping: Mapping,
    pub store: Store,
    pub diagnostics: Diagnostics,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Cadence
        if self.cadence.sample_rate_hz == 0 {
            eyre::bail!("cadence.sample_rate_hz must be > 0");
        }
        if self.cadence.sample_rate_hz > 1000 {
            eyre::bail!("cadence.sample_rate_hz must be <= 1000");
        }
        if self.cadence.update_every() == 0 {
            eyre::bail!("cadence.update_every must be >= 1");
        }

        // Mapping
        if self.mapping.analog_max == 0 {
            eyre::bail!("mapping.analog_max must be >= 1");
        }
        if self.mapping.dial_threshold >= self.mapping.analog_max {
            eyre::bail!("mapping.dial_threshold must be < mapping.analog_max");
        }
        if self.mapping.pos_min > self.mapping.pos_max {
            eyre::bail!("mapping.pos_min must be <= mapping.pos_max");
        }
        if self.mapping.pos_max > 180 {
            eyre::bail!("mapping.pos_max must be <= 180 degrees");
        }

        // Store
        if self.store.size < 2 {
            eyre::bail!("store.size must be >= 2");
        }
        if self.store.address > self.store.size - 2 {
            eyre::bail!("store.address must leave room for two bytes inside store.size");
        }

        // Pins
        if self.pins.light_channel > 7 || self.pins.dial_channel > 7 {
            eyre::bail!("pins.*_channel must be an MCP3008 channel (0..=7)");
        }
        if self.pins.light_channel == self.pins.dial_channel {
            eyre::bail!("pins.light_channel and pins.dial_channel must differ");
        }
        if self.pins.servo_pwm > 1 {
            eyre::bail!("pins.servo_pwm must be 0 or 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = load_toml("").expect("parse empty");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.cadence.sample_rate_hz, 20);
        assert_eq!(cfg.cadence.update_every(), 20);
        assert_eq!(cfg.mapping.pos_min, 93);
        assert_eq!(cfg.mapping.pos_max, 180);
        assert_eq!(cfg.mapping.dial_threshold, 50);
        assert!(cfg.diagnostics.enabled);
    }

    #[test]
    fn update_every_overrides_rate() {
        let cfg = load_toml("[cadence]\nsample_rate_hz = 50\nupdate_every = 5\n").unwrap();
        assert_eq!(cfg.cadence.update_every(), 5);
    }
}
