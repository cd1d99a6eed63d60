//! Outcome of a single control cycle.

use crate::sampler::Sample;

/// What one call to `step` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Inputs seen this cycle.
    pub sample: Sample,
    /// New threshold, when a press changed it.
    pub recalibrated: Option<u16>,
    /// Physical store writes issued this cycle (0..=2).
    pub store_writes: u8,
    /// Whether this cycle was a cadence tick.
    pub tick: bool,
    /// Position written to the actuator this cycle.
    pub actuator_written: Option<u8>,
    /// Non-fatal failures (store or actuator) swallowed this cycle.
    pub warnings: u8,
}

/// Running totals kept by the controller since it was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Cycles that sampled their inputs successfully.
    pub cycles: u64,
    /// Cycles skipped because an input read failed.
    pub failed_cycles: u64,
    pub ticks: u64,
    pub recalibrations: u64,
    pub store_writes: u64,
    pub actuator_writes: u64,
    pub warnings: u64,
}
