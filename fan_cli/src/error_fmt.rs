//! Human-readable error descriptions, exit codes and structured JSON error formatting.

use fan_core::error::{BuildError, FanError};
use fan_hardware::error::HwError;

/// Exit code for failures with no more specific category.
pub const EXIT_GENERIC: i32 = 1;
/// Config file missing, unparsable or invalid.
pub const EXIT_CONFIG: i32 = 2;
/// Threshold store could not be opened, read or written.
pub const EXIT_STORE: i32 = 3;
/// Input or actuator hardware failed.
pub const EXIT_HARDWARE: i32 = 4;

/// Stable short name for the error category, used as the JSON `reason`.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "Config",
            BuildError::MissingInputs | BuildError::MissingActuator | BuildError::MissingStore => {
                "Build"
            }
        };
    }
    if let Some(fe) = err.downcast_ref::<FanError>() {
        return match fe {
            FanError::Config(_) => "Config",
            FanError::Store(_) => "Store",
            FanError::Input(_) => "Input",
            FanError::Actuator(_) => "Actuator",
        };
    }
    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::StoreAddress { .. } => "Store",
            _ => "Hardware",
        };
    }
    "Error"
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingInputs => {
                "What happened: No input source was provided to the controller.\nLikely causes: The sensor backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the inputs are created successfully and passed via with_inputs(...).".to_string()
            }
            BuildError::MissingActuator => {
                "What happened: No actuator was provided to the controller.\nLikely causes: The servo backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the servo is created successfully and passed via with_actuator(...).".to_string()
            }
            BuildError::MissingStore => {
                "What happened: No threshold store was provided to the controller.\nLikely causes: The store was not wired into the builder.\nHow to fix: Pass a store via with_store(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in [cadence] or [mapping].\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(fe) = err.downcast_ref::<FanError>() {
        return match fe {
            FanError::Config(msg) => format!(
                "What happened: Configuration problem: {msg}.\nLikely causes: Missing file, TOML syntax error, or a value outside its allowed range.\nHow to fix: Check --config and the value named above, then rerun."
            ),
            FanError::Store(msg) => format!(
                "What happened: Threshold store failed: {msg}.\nLikely causes: Unwritable [store] path, or [store] address beyond the image size.\nHow to fix: Check permissions on store.path and that store.address + 1 < store.size. Context: {err:#}"
            ),
            FanError::Input(msg) => format!(
                "What happened: Reading the sensors failed: {msg}.\nLikely causes: SPI not enabled, MCP3008 wiring, or a bad [pins] channel.\nHow to fix: Enable SPI, verify wiring and the light/dial channels in [pins]."
            ),
            FanError::Actuator(msg) => format!(
                "What happened: Driving the servo failed: {msg}.\nLikely causes: PWM overlay not enabled or wrong [pins] servo_pwm.\nHow to fix: Enable the PWM overlay and check servo_pwm (0 or 1)."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map error categories to stable exit codes.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "Config" => EXIT_CONFIG,
        "Store" => EXIT_STORE,
        "Input" | "Actuator" | "Hardware" => EXIT_HARDWARE,
        _ => EXIT_GENERIC,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_exit_codes() {
        let e = eyre::Report::new(FanError::Config("bad".into()));
        assert_eq!(exit_code_for_error(&e), EXIT_CONFIG);
        let e = eyre::Report::new(FanError::Store("stuck".into())).wrap_err("loading threshold");
        assert_eq!(exit_code_for_error(&e), EXIT_STORE);
        let e = eyre::Report::new(FanError::Actuator("pwm".into()));
        assert_eq!(exit_code_for_error(&e), EXIT_HARDWARE);
        let e = eyre::Report::new(BuildError::InvalidConfig("pos_max must be <= 180"));
        assert_eq!(exit_code_for_error(&e), EXIT_CONFIG);
        assert_eq!(exit_code_for_error(&eyre::eyre!("other")), EXIT_GENERIC);
    }

    #[test]
    fn json_error_has_reason_and_message() {
        let e = eyre::Report::new(FanError::Input("spi".into()));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Input");
        assert!(v["message"].as_str().unwrap().contains("spi"));
    }
}
