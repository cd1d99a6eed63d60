//! Button-triggered threshold recalibration.
//!
//! The new threshold is not the raw light reading. The deviation between
//! twice the current light level and the previous threshold is pushed through
//! a half-cosine centred on 512, so a single noisy reading moves the
//! threshold smoothly and the result always lands in the analog range.

/// Amplitude and offset of the response curve.
pub const CURVE_SCALE: f64 = 512.0;
/// Deviation divisor of the response curve.
pub const CURVE_DIVISOR: f64 = 329.0;
/// Phase offset of the response curve.
pub const CURVE_PHASE: f64 = std::f64::consts::PI;

/// True on a false -> true transition between two consecutive samples.
#[inline]
pub fn rising_edge(previous: bool, current: bool) -> bool {
    current && !previous
}

/// Candidate threshold for a calibration press.
///
/// `round(512 * cos((2*light - threshold)/329 + PI) + 512)`, clamped to
/// `[0, analog_max]`. Deterministic for a given input pair.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn recalibrated_threshold(light: u16, threshold: u16, analog_max: u16) -> u16 {
    let deviation = 2.0 * f64::from(light) - f64::from(threshold);
    let curve = CURVE_SCALE * (deviation / CURVE_DIVISOR + CURVE_PHASE).cos() + CURVE_SCALE;
    let clamped = curve.round().clamp(0.0, f64::from(analog_max));
    // In range after the clamp; the cast cannot truncate.
    clamped as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_only_on_press() {
        assert!(rising_edge(false, true));
        assert!(!rising_edge(true, true));
        assert!(!rising_edge(true, false));
        assert!(!rising_edge(false, false));
    }

    #[test]
    fn balanced_inputs_hit_the_trough() {
        // 2*light == threshold -> cos(PI) == -1 -> 0
        assert_eq!(recalibrated_threshold(100, 200, 1023), 0);
        assert_eq!(recalibrated_threshold(0, 0, 1023), 0);
    }

    #[test]
    fn peak_is_clamped_to_analog_max() {
        // Rounds to 1024 before clamping.
        assert_eq!(recalibrated_threshold(0, 1023, 1023), 1023);
        assert_eq!(recalibrated_threshold(1023, 1023, 1023), 1023);
    }
}
