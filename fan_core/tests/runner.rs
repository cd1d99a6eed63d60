use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fan_core::mocks::{MemoryStore, RecordingActuator, ScriptedInputs};
use fan_core::{
    CadenceCfg, FanController, MemorySink, RunOptions, StopReason, run,
};
use fan_traits::{Clock, ManualClock};

fn fan(inputs: ScriptedInputs, sink: &MemorySink) -> FanController {
    FanController::builder()
        .with_inputs(inputs)
        .with_actuator(RecordingActuator::new())
        .with_store(MemoryStore::with_threshold(16, 0, 400))
        .with_diagnostics(sink.clone())
        .build()
        .expect("valid controller")
}

#[test]
fn one_second_of_default_cadence() {
    let sink = MemorySink::new();
    let mut c = fan(ScriptedInputs::constant(600, 800, false), &sink);
    let clock = ManualClock::new();
    let summary = run(&mut c, &clock, &RunOptions::cycles(22));

    assert_eq!(summary.cycles, 22);
    assert_eq!(summary.ticks, 1);
    assert_eq!(summary.actuator_writes, 1);
    assert_eq!(summary.elapsed_ms, 22 * 50);
    assert_eq!(clock.elapsed(), Duration::from_millis(1100));
    assert_eq!(
        sink.lines(),
        vec![
            "Start".to_string(),
            "Threshold: 400 Dial: 800 Light: 600 Servo: 160".to_string()
        ]
    );
}

#[test]
fn shutdown_flag_stops_before_the_next_cycle() {
    let sink = MemorySink::new();
    let mut c = fan(ScriptedInputs::constant(600, 800, false), &sink);
    let flag = Arc::new(AtomicBool::new(true));
    let summary = run(
        &mut c,
        &ManualClock::new(),
        &RunOptions::default().with_shutdown(flag.clone()),
    );
    assert_eq!(summary.stopped_by, StopReason::Shutdown);
    assert_eq!(summary.cycles, 0);
    assert!(flag.load(Ordering::Relaxed));
}

/// Clock that requests shutdown after a number of sleeps.
struct StopAfter {
    inner: ManualClock,
    flag: Arc<AtomicBool>,
    after: u64,
}

impl Clock for StopAfter {
    fn now(&self) -> std::time::Instant {
        self.inner.now()
    }

    fn sleep(&self, d: Duration) {
        self.inner.sleep(d);
        if self.inner.sleeps() >= self.after {
            self.flag.store(true, Ordering::Relaxed);
        }
    }
}

#[test]
fn shutdown_mid_run_reports_partial_totals() {
    let sink = MemorySink::new();
    let mut c = fan(ScriptedInputs::constant(600, 800, false), &sink);
    let flag = Arc::new(AtomicBool::new(false));
    let clock = StopAfter {
        inner: ManualClock::new(),
        flag: flag.clone(),
        after: 30,
    };
    let summary = run(&mut c, &clock, &RunOptions::default().with_shutdown(flag));
    assert_eq!(summary.stopped_by, StopReason::Shutdown);
    assert_eq!(summary.cycles, 30);
    assert_eq!(summary.ticks, 1);
}

#[test]
fn failed_reads_do_not_stop_the_loop() {
    let inputs = ScriptedInputs::constant(600, 800, false);
    let sink = MemorySink::new();
    let mut c = fan(inputs.clone(), &sink);
    inputs.fail_next();
    let summary = run(&mut c, &ManualClock::new(), &RunOptions::cycles(10));
    assert_eq!(summary.cycles, 10);
    assert_eq!(summary.failed_cycles, 1);
    assert_eq!(inputs.cycles(), 9);
}

#[test]
fn faster_sample_rate_shortens_the_period() {
    let sink = MemorySink::new();
    let mut c = FanController::builder()
        .with_inputs(ScriptedInputs::constant(600, 800, false))
        .with_actuator(RecordingActuator::new())
        .with_store(MemoryStore::with_threshold(16, 0, 400))
        .with_cadence(CadenceCfg {
            sample_rate_hz: 100,
            update_every: 100,
        })
        .with_diagnostics(sink.clone())
        .build()
        .unwrap();
    let clock = ManualClock::new();
    run(&mut c, &clock, &RunOptions::cycles(4));
    assert_eq!(clock.elapsed(), Duration::from_millis(40));
}
