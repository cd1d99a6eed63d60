//! The control loop state machine (`ControllerState`) and its driver
//! (`ControllerCore`).
//!
//! `ControllerState::advance` is pure: it takes one sample and decides what
//! should happen. `ControllerCore::step` samples the inputs, applies the
//! decision to the store and actuator, and reports diagnostics.

use fan_traits::{ActuatorSink, InputSource, PersistentStore};

use crate::cadence::Cadence;
use crate::calibration::{recalibrated_threshold, rising_edge};
use crate::config::{CadenceCfg, MappingCfg, StoreCfg};
use crate::diagnostics::{DiagnosticSink, Snapshot};
use crate::error::Result;
use crate::hw_error::{Origin, map_hw_error};
use crate::mapper::actuator_target;
use crate::sampler::{self, Sample};
use crate::status::{ControllerStats, CycleReport};
use crate::threshold_store::save_threshold;

/// Everything the loop remembers between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub light: u16,
    pub dial: u16,
    pub button: bool,
    pub previous_button: bool,
    pub threshold: u16,
    /// Last position the actuator accepted; `None` before the first write.
    pub actuator_position: Option<u8>,
    pub cadence: Cadence,
}

/// What a cycle should do, as decided by `ControllerState::advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleDecision {
    /// New threshold to persist.
    pub recalibrated: Option<u16>,
    pub tick: bool,
    /// Mapped target, computed on ticks only.
    pub target: Option<u8>,
    /// Target to send to the actuator; `None` when it would not change anything.
    pub actuator_command: Option<u8>,
}

impl ControllerState {
    pub fn with_threshold(threshold: u16) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Fold one sample into the state.
    ///
    /// Calibration runs before the cadence check, so a tick on the same cycle
    /// as a press already sees the new threshold. The actuator position is
    /// not touched here; call `commit_position` once the write succeeded.
    pub fn advance(
        &mut self,
        sample: Sample,
        mapping: &MappingCfg,
        update_every: u32,
    ) -> CycleDecision {
        self.light = sample.light;
        self.dial = sample.dial;
        self.button = sample.button;

        let mut decision = CycleDecision::default();
        if rising_edge(self.previous_button, self.button) {
            let candidate = recalibrated_threshold(self.light, self.threshold, mapping.analog_max);
            if candidate != self.threshold {
                self.threshold = candidate;
                decision.recalibrated = Some(candidate);
            }
        }
        self.previous_button = self.button;

        decision.tick = self.cadence.poll(update_every);
        if decision.tick {
            let target = actuator_target(mapping, self.dial, self.light, self.threshold);
            decision.target = Some(target);
            if self.actuator_position != Some(target) {
                decision.actuator_command = Some(target);
            }
        }
        decision
    }

    /// Record a position the actuator accepted.
    pub fn commit_position(&mut self, position: u8) {
        self.actuator_position = Some(position);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            threshold: self.threshold,
            dial: self.dial,
            light: self.light,
            servo: self.actuator_position.unwrap_or(0),
        }
    }
}

/// Unified controller for both the boxed and the statically dispatched variant.
pub struct ControllerCore<I: InputSource, A: ActuatorSink, P: PersistentStore> {
    pub(crate) inputs: I,
    pub(crate) actuator: A,
    pub(crate) store: P,
    pub(crate) mapping: MappingCfg,
    pub(crate) cadence: CadenceCfg,
    pub(crate) store_cfg: StoreCfg,
    pub(crate) state: ControllerState,
    pub(crate) diagnostics: Option<Box<dyn DiagnosticSink>>,
    pub(crate) stats: ControllerStats,
}

impl<I: InputSource, A: ActuatorSink, P: PersistentStore> core::fmt::Debug
    for ControllerCore<I, A, P>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerCore")
            .field("state", &self.state)
            .field("mapping", &self.mapping)
            .field("cadence", &self.cadence)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl<I: InputSource, A: ActuatorSink, P: PersistentStore> ControllerCore<I, A, P> {
    /// Announce the start of the loop on the diagnostic sink.
    pub fn begin(&mut self) {
        tracing::info!(
            threshold = self.state.threshold,
            update_every = self.cadence.update_every,
            sample_rate_hz = self.cadence.sample_rate_hz,
            "controller started"
        );
        if let Some(sink) = self.diagnostics.as_mut() {
            sink.start();
        }
    }

    /// One cycle: sample, calibrate, and on a tick drive the actuator and
    /// report diagnostics.
    ///
    /// Only input failures are returned; the state is left untouched so the
    /// cycle can simply be retried. Store and actuator failures are logged
    /// and counted in the report.
    pub fn step(&mut self) -> Result<CycleReport> {
        let sample = match sampler::sample(&mut self.inputs, self.mapping.analog_max) {
            Ok(sample) => sample,
            Err(e) => {
                self.stats.failed_cycles += 1;
                return Err(e);
            }
        };
        self.stats.cycles += 1;

        let decision = self
            .state
            .advance(sample, &self.mapping, self.cadence.update_every);
        let mut report = CycleReport {
            sample,
            tick: decision.tick,
            ..CycleReport::default()
        };

        if let Some(threshold) = decision.recalibrated {
            self.stats.recalibrations += 1;
            report.recalibrated = Some(threshold);
            tracing::info!(threshold, light = sample.light, "threshold recalibrated");
            match save_threshold(&mut self.store, self.store_cfg.address, threshold) {
                Ok(written) => {
                    report.store_writes = written;
                    self.stats.store_writes += u64::from(written);
                }
                Err(e) => {
                    report.warnings += 1;
                    tracing::warn!(error = %format_args!("{e:#}"), threshold, "persisting threshold failed");
                }
            }
        }

        if decision.tick {
            self.stats.ticks += 1;
            if let Some(position) = decision.actuator_command {
                match self.actuator.move_to(position) {
                    Ok(()) => {
                        self.state.commit_position(position);
                        self.stats.actuator_writes += 1;
                        report.actuator_written = Some(position);
                        tracing::debug!(position, dial = sample.dial, "actuator moved");
                    }
                    Err(e) => {
                        report.warnings += 1;
                        let err = map_hw_error(&*e, Origin::Actuator);
                        tracing::warn!(error = %err, position, "actuator write failed");
                    }
                }
            }
            if let Some(sink) = self.diagnostics.as_mut() {
                sink.report(&self.state.snapshot());
            }
        }

        self.stats.warnings += u64::from(report.warnings);
        Ok(report)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn threshold(&self) -> u16 {
        self.state.threshold
    }

    pub fn actuator_position(&self) -> Option<u8> {
        self.state.actuator_position
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn mapping(&self) -> &MappingCfg {
        &self.mapping
    }

    pub fn cadence_cfg(&self) -> &CadenceCfg {
        &self.cadence
    }

    pub fn store_cfg(&self) -> &StoreCfg {
        &self.store_cfg
    }

    pub fn inputs(&self) -> &I {
        &self.inputs
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_cycle() -> u32 {
        0
    }

    #[test]
    fn press_recalibrates_once() {
        let cfg = MappingCfg::default();
        let mut st = ControllerState::with_threshold(400);
        let d = st.advance(Sample::new(600, 800, true), &cfg, 100);
        assert_eq!(d.recalibrated, Some(900));
        // Held button: no second edge.
        let d = st.advance(Sample::new(600, 800, true), &cfg, 100);
        assert_eq!(d.recalibrated, None);
        assert_eq!(st.threshold, 900);
    }

    #[test]
    fn unchanged_candidate_is_not_reported() {
        // 2*light - threshold chosen so the curve returns the same value.
        let cfg = MappingCfg::default();
        let mut st = ControllerState::with_threshold(0);
        let d = st.advance(Sample::new(0, 0, true), &cfg, 100);
        assert_eq!(d.recalibrated, None);
        assert!(st.previous_button);
    }

    #[test]
    fn first_tick_always_commands() {
        let cfg = MappingCfg::default();
        let mut st = ControllerState::with_threshold(1023);
        // update_every = 0: every cycle after the first is a tick.
        assert!(!st.advance(Sample::new(0, 10, false), &cfg, every_cycle()).tick);
        let d = st.advance(Sample::new(0, 10, false), &cfg, every_cycle());
        assert!(d.tick);
        assert_eq!(d.target, Some(93));
        assert_eq!(d.actuator_command, Some(93));
    }

    #[test]
    fn committed_position_suppresses_repeat() {
        let cfg = MappingCfg::default();
        let mut st = ControllerState::with_threshold(400);
        st.commit_position(160);
        st.advance(Sample::new(600, 800, false), &cfg, every_cycle());
        let d = st.advance(Sample::new(600, 800, false), &cfg, every_cycle());
        assert_eq!(d.target, Some(160));
        assert_eq!(d.actuator_command, None);
    }

    #[test]
    fn snapshot_reports_zero_before_first_write() {
        let st = ControllerState::with_threshold(512);
        assert_eq!(st.snapshot().servo, 0);
        assert_eq!(st.snapshot().threshold, 512);
    }
}
