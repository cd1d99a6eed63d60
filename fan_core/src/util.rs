//! Cycle-period helpers.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Cycle period in milliseconds for a sampling rate in Hz.
/// - Treats `hz == 0` as 1 Hz in release builds (asserts in debug).
/// - Never returns less than 1 ms.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    debug_assert!(hz > 0, "sample_rate_hz must be > 0");
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}
