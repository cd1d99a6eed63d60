//! Dial-to-servo mapping with the light gate.

use crate::config::MappingCfg;

/// Integer linear re-map of `x` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Truncating division, like the classic microcontroller `map()`. A degenerate
/// input span maps everything to `out_max`.
#[inline]
pub fn map_range(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> i64 {
    if in_max <= in_min {
        return out_max;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Servo target for the current inputs.
///
/// The fan only runs when the dial is above its dead zone and the light is
/// above the calibrated threshold; otherwise it is parked at `pos_min`. The
/// dial therefore doubles as a manual off switch.
pub fn actuator_target(cfg: &MappingCfg, dial: u16, light: u16, threshold: u16) -> u8 {
    if dial <= cfg.dial_threshold || light <= threshold {
        return cfg.pos_min;
    }
    let mapped = map_range(
        i64::from(dial),
        i64::from(cfg.dial_threshold) + 1,
        i64::from(cfg.analog_max),
        i64::from(cfg.pos_min),
        i64::from(cfg.pos_max),
    );
    let bounded = mapped.clamp(i64::from(cfg.pos_min), i64::from(cfg.pos_max));
    u8::try_from(bounded).unwrap_or(cfg.pos_max)
}
