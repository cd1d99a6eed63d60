use fan_core::error::BuildError;
use fan_core::mocks::{MemoryStore, RecordingActuator, ScriptedInputs};
use fan_core::{CadenceCfg, FanController, MappingCfg, StoreCfg};
use rstest::rstest;

#[rstest]
fn builder_missing_store_yields_typed_build_error() {
    let err = FanController::builder()
        .with_inputs(ScriptedInputs::constant(0, 0, false))
        .with_actuator(RecordingActuator::new())
        // missing with_store()
        .try_build()
        .expect_err("should fail with MissingStore");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingStore) => {}
        other => panic!("expected MissingStore, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_inputs_is_reported_first() {
    let err = FanController::builder()
        .try_build()
        .expect_err("nothing provided");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingInputs)
    ));
}

#[rstest]
#[case::zero_rate(MappingCfg::default(), CadenceCfg { sample_rate_hz: 0, update_every: 20 }, "sample_rate_hz")]
#[case::zero_update(MappingCfg::default(), CadenceCfg { sample_rate_hz: 20, update_every: 0 }, "update_every")]
#[case::dead_zone_too_wide(
    MappingCfg { dial_threshold: 1023, ..MappingCfg::default() },
    CadenceCfg::default(),
    "dial_threshold"
)]
#[case::inverted_positions(
    MappingCfg { pos_min: 120, pos_max: 100, ..MappingCfg::default() },
    CadenceCfg::default(),
    "pos_min"
)]
#[case::beyond_servo_range(
    MappingCfg { pos_max: 200, ..MappingCfg::default() },
    CadenceCfg::default(),
    "pos_max"
)]
fn invalid_config_is_rejected(
    #[case] mapping: MappingCfg,
    #[case] cadence: CadenceCfg,
    #[case] needle: &str,
) {
    let err = FanController::builder()
        .with_inputs(ScriptedInputs::constant(0, 0, false))
        .with_actuator(RecordingActuator::new())
        .with_store(MemoryStore::with_threshold(16, 0, 100))
        .with_mapping(mapping)
        .with_cadence(cadence)
        .build()
        .expect_err("invalid config");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[rstest]
fn last_store_address_is_rejected() {
    let err = FanController::builder()
        .with_inputs(ScriptedInputs::constant(0, 0, false))
        .with_actuator(RecordingActuator::new())
        .with_store(MemoryStore::new(16))
        .with_store_cfg(StoreCfg { address: u16::MAX })
        .build()
        .expect_err("no room for low byte");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn unreadable_store_fails_the_build() {
    let store = MemoryStore::new(16);
    store.set_fail_reads(true);
    let err = FanController::builder()
        .with_inputs(ScriptedInputs::constant(0, 0, false))
        .with_actuator(RecordingActuator::new())
        .with_store(store)
        .build()
        .expect_err("store read fails");
    assert!(format!("{err:#}").contains("loading stored threshold"));
}
