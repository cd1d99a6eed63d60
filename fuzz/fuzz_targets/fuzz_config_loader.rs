#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = toml::from_str::<fan_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // Anything that validates must also convert and map without panicking.
    let mapping = fan_core::MappingCfg::from(&cfg.mapping);
    let cadence = fan_core::CadenceCfg::from(&cfg.cadence);
    let _ = cadence.period();
    for dial in [0, mapping.dial_threshold, mapping.analog_max] {
        let pos = fan_core::actuator_target(&mapping, dial, mapping.analog_max, 0);
        assert!(pos >= mapping.pos_min && pos <= mapping.pos_max);
    }
});
