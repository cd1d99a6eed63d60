//! Command implementations: backend assembly, the run loop, self-check and
//! threshold maintenance.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use fan_config::Config;
use fan_core::error::{FanError, Result};
use fan_core::hw_error::{Origin, map_hw_error};
use fan_core::{
    CadenceCfg, FanController, FileSink, MappingCfg, RunOptions, RunSummary, StoreCfg,
    TracingSink, WriterSink, load_threshold, save_threshold,
};
use fan_hardware::FileStore;
use fan_traits::{ActuatorSink, InputSource, MonotonicClock};

/// Simulated light level (0..=analog_max).
#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub const ENV_SIM_LIGHT: &str = "FAN_SIM_LIGHT";
/// Simulated dial position (0..=analog_max).
#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub const ENV_SIM_DIAL: &str = "FAN_SIM_DIAL";
/// Cycle at which the simulated button is pressed.
#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub const ENV_SIM_PRESS_AT: &str = "FAN_SIM_PRESS_AT";

fn config_error(msg: String) -> eyre::Report {
    eyre::Report::new(FanError::Config(msg))
}

/// Load and validate the config file, tagging failures as configuration errors.
pub fn load_config(path: &Path) -> Result<Config> {
    fan_config::load_file(path).map_err(|e| config_error(format!("{e:#}")))
}

#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
fn env_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| config_error(format!("{name} must be a non-negative integer, got {v:?}"))),
        Err(_) => Ok(default),
    }
}

/// Open the file-backed threshold store.
pub fn open_store(cfg: &Config) -> Result<FileStore> {
    FileStore::open(&cfg.store.path, cfg.store.size)
        .map_err(|e| eyre::Report::new(map_hw_error(&e, Origin::Store)))
        .wrap_err_with(|| format!("opening store image {}", cfg.store.path.display()))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open_inputs(cfg: &Config) -> Result<Box<dyn InputSource>> {
    let inputs = fan_hardware::pi::Mcp3008Inputs::new(
        cfg.pins.button,
        cfg.pins.light_channel,
        cfg.pins.dial_channel,
    )
    .map_err(|e| eyre::Report::new(map_hw_error(&e, Origin::Input)))
    .wrap_err("open MCP3008 inputs")?;
    tracing::info!(
        button = cfg.pins.button,
        light_channel = cfg.pins.light_channel,
        dial_channel = cfg.pins.dial_channel,
        "hardware inputs ready"
    );
    Ok(Box::new(inputs))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn open_inputs(cfg: &Config) -> Result<Box<dyn InputSource>> {
    let light: u16 = env_or(ENV_SIM_LIGHT, cfg.mapping.analog_max / 2)?;
    let dial: u16 = env_or(ENV_SIM_DIAL, 0)?;
    let press_at: Option<u64> = match std::env::var(ENV_SIM_PRESS_AT) {
        Ok(_) => Some(env_or(ENV_SIM_PRESS_AT, 0)?),
        Err(_) => None,
    };
    let mut inputs = fan_hardware::SimulatedInputs::new(light, dial);
    if let Some(at) = press_at {
        inputs = inputs.with_press_at(at);
    }
    tracing::info!(light, dial, press_at, "simulated inputs ready");
    Ok(Box::new(inputs))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open_actuator(cfg: &Config) -> Result<Box<dyn ActuatorSink>> {
    let servo = fan_hardware::pi::PwmServo::new(cfg.pins.servo_pwm, cfg.mapping.pos_min)
        .map_err(|e| eyre::Report::new(map_hw_error(&e, Origin::Actuator)))
        .wrap_err("open PWM servo")?;
    tracing::info!(channel = cfg.pins.servo_pwm, "hardware servo ready");
    Ok(Box::new(servo))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn open_actuator(_cfg: &Config) -> Result<Box<dyn ActuatorSink>> {
    Ok(Box::new(fan_hardware::SimulatedServo::new()))
}

/// Assemble the controller and run it until the cycle limit or Ctrl-C.
pub fn cmd_run(
    cfg: &Config,
    cycles: Option<u64>,
    no_diagnostics: bool,
    json: bool,
) -> Result<RunSummary> {
    let mut builder = FanController::builder()
        .with_inputs(open_inputs(cfg)?)
        .with_actuator(open_actuator(cfg)?)
        .with_store(open_store(cfg)?)
        .with_mapping(MappingCfg::from(&cfg.mapping))
        .with_cadence(CadenceCfg::from(&cfg.cadence))
        .with_store_cfg(StoreCfg::from(&cfg.store));

    if cfg.diagnostics.enabled && !no_diagnostics {
        builder = match (&cfg.diagnostics.file, json) {
            (Some(path), _) => builder.with_diagnostics(FileSink::new(path)),
            (None, true) => builder.with_diagnostics(TracingSink),
            (None, false) => builder.with_diagnostics(WriterSink::new(std::io::stdout())),
        };
    }
    let mut controller = builder.build()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler; stop with the cycle limit");
    }

    let opts = RunOptions {
        max_cycles: cycles,
        shutdown: Some(shutdown),
    };
    let summary = fan_core::run(&mut controller, &MonotonicClock::new(), &opts);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "stopped_by": format!("{:?}", summary.stopped_by),
                "cycles": summary.cycles,
                "failed_cycles": summary.failed_cycles,
                "ticks": summary.ticks,
                "recalibrations": summary.recalibrations,
                "actuator_writes": summary.actuator_writes,
                "store_writes": summary.store_writes,
                "warnings": summary.warnings,
                "threshold": summary.threshold,
                "elapsed_ms": summary.elapsed_ms,
            })
        );
    }
    Ok(summary)
}

/// Open every device once and read each input and the stored threshold.
pub fn cmd_self_check(cfg: &Config, json: bool) -> Result<()> {
    let mut inputs = open_inputs(cfg)?;
    let _actuator = open_actuator(cfg)?;
    let sample = fan_core::sampler::sample(&mut inputs, cfg.mapping.analog_max)?;
    let mut store = open_store(cfg)?;
    let threshold = load_threshold(&mut store, cfg.store.address)?;
    tracing::info!(
        light = sample.light,
        dial = sample.dial,
        button = sample.button,
        threshold,
        "self-check passed"
    );
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "light": sample.light,
                "dial": sample.dial,
                "button": sample.button,
                "threshold": threshold,
            })
        );
    } else {
        println!("ok");
    }
    Ok(())
}

/// Print the stored threshold, or persist a new one.
pub fn cmd_threshold(cfg: &Config, set: Option<u16>, json: bool) -> Result<()> {
    let mut store = open_store(cfg)?;
    let address = cfg.store.address;
    let analog_max = cfg.mapping.analog_max;

    let (threshold, written) = match set {
        Some(value) => {
            if value > analog_max {
                return Err(config_error(format!(
                    "threshold {value} exceeds mapping.analog_max ({analog_max})"
                )));
            }
            let written = save_threshold(&mut store, address, value)?;
            tracing::info!(threshold = value, written, "threshold stored");
            (value, Some(written))
        }
        None => (load_threshold(&mut store, address)?, None),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "threshold": threshold,
                "in_range": threshold <= analog_max,
                "bytes_written": written,
            })
        );
        return Ok(());
    }
    match written {
        Some(n) => println!("threshold: {threshold} ({n} bytes written)"),
        None if threshold > analog_max => {
            println!("threshold: {threshold} (out of range, used as {analog_max})");
        }
        None => println!("threshold: {threshold}"),
    }
    Ok(())
}
