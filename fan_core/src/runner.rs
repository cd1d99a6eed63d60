//! Fixed-period driver for the controller.
//!
//! One `step` per cycle followed by one sleep of the cadence period. Input
//! failures are logged and the loop carries on; nothing in here is fatal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fan_traits::{ActuatorSink, Clock, InputSource, PersistentStore};

use crate::controller::ControllerCore;

/// When to stop.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many cycles (failed cycles included). `None` runs until shutdown.
    pub max_cycles: Option<u64>,
    /// Checked between cycles; set it to stop the loop.
    pub shutdown: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    pub fn cycles(n: u64) -> Self {
        Self {
            max_cycles: Some(n),
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CycleLimit,
    Shutdown,
}

/// Totals for one `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stopped_by: StopReason,
    /// Cycles attempted, including failed ones.
    pub cycles: u64,
    pub failed_cycles: u64,
    pub ticks: u64,
    pub recalibrations: u64,
    pub actuator_writes: u64,
    pub store_writes: u64,
    pub warnings: u64,
    pub threshold: u16,
    pub elapsed_ms: u64,
}

/// Run the controller until the cycle limit or a shutdown request.
pub fn run<I, A, P, C>(
    controller: &mut ControllerCore<I, A, P>,
    clock: &C,
    opts: &RunOptions,
) -> RunSummary
where
    I: InputSource,
    A: ActuatorSink,
    P: PersistentStore,
    C: Clock + ?Sized,
{
    let period = controller.cadence_cfg().period();
    let before = controller.stats();
    let epoch = clock.now();
    controller.begin();

    let mut attempted = 0u64;
    let stopped_by = loop {
        if opts.shutdown_requested() {
            break StopReason::Shutdown;
        }
        if opts.max_cycles.is_some_and(|max| attempted >= max) {
            break StopReason::CycleLimit;
        }
        attempted += 1;
        if let Err(e) = controller.step() {
            tracing::warn!(error = %format_args!("{e:#}"), cycle = attempted, "cycle skipped");
        }
        clock.sleep(period);
    };

    let after = controller.stats();
    let summary = RunSummary {
        stopped_by,
        cycles: attempted,
        failed_cycles: after.failed_cycles - before.failed_cycles,
        ticks: after.ticks - before.ticks,
        recalibrations: after.recalibrations - before.recalibrations,
        actuator_writes: after.actuator_writes - before.actuator_writes,
        store_writes: after.store_writes - before.store_writes,
        warnings: after.warnings - before.warnings,
        threshold: controller.threshold(),
        elapsed_ms: clock.ms_since(epoch),
    };
    tracing::info!(
        stopped_by = ?summary.stopped_by,
        cycles = summary.cycles,
        ticks = summary.ticks,
        recalibrations = summary.recalibrations,
        actuator_writes = summary.actuator_writes,
        warnings = summary.warnings,
        threshold = summary.threshold,
        "run finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_controller;
    use crate::config::{CadenceCfg, MappingCfg, StoreCfg};
    use crate::mocks::{MemoryStore, RecordingActuator, ScriptedInputs};
    use fan_traits::ManualClock;
    use std::time::Duration;

    #[test]
    fn sleeps_once_per_cycle() {
        let mut c = build_controller(
            ScriptedInputs::constant(600, 800, false),
            RecordingActuator::new(),
            MemoryStore::with_threshold(16, 0, 400),
            MappingCfg::default(),
            CadenceCfg::default(),
            StoreCfg::default(),
            None,
        )
        .unwrap();
        let clock = ManualClock::new();
        let summary = run(&mut c, &clock, &RunOptions::cycles(5));
        assert_eq!(summary.cycles, 5);
        assert_eq!(summary.stopped_by, StopReason::CycleLimit);
        assert_eq!(clock.sleeps(), 5);
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
        assert_eq!(summary.elapsed_ms, 250);
    }
}
