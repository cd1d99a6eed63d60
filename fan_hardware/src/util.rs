use std::time::Duration;

use crate::error::{HwError, Result};

/// Servo frame period (50 Hz).
pub const SERVO_PERIOD: Duration = Duration::from_millis(20);
/// Pulse width at 0 degrees.
pub const SERVO_MIN_PULSE_US: u64 = 500;
/// Pulse width at 180 degrees.
pub const SERVO_MAX_PULSE_US: u64 = 2500;

/// Convert a servo angle in degrees (0..=180) to its PWM pulse width.
pub fn angle_to_pulse(angle: u8) -> Result<Duration> {
    if angle > 180 {
        return Err(HwError::ServoAngle(angle));
    }
    let span = SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US;
    let us = SERVO_MIN_PULSE_US + u64::from(angle) * span / 180;
    Ok(Duration::from_micros(us))
}

/// Build the three-byte MCP3008 single-ended read command for `channel`.
pub fn mcp3008_command(channel: u8) -> Result<[u8; 3]> {
    if channel > 7 {
        return Err(HwError::AdcChannel(channel));
    }
    Ok([0x01, (0x08 | channel) << 4, 0x00])
}

/// Extract the 10-bit conversion result from an MCP3008 response frame.
#[inline]
pub fn mcp3008_value(rx: [u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}
