//! Per-cycle input sampling.
//!
//! Reads light, dial and button once per cycle, in that order. Analog values
//! beyond the configured full scale are clamped, never rejected.
use eyre::WrapErr;
use fan_traits::InputSource;

use crate::error::Result;
use crate::hw_error::{Origin, map_hw_error};

/// One cycle's worth of inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub light: u16,
    pub dial: u16,
    pub button: bool,
}

impl Sample {
    pub fn new(light: u16, dial: u16, button: bool) -> Self {
        Self {
            light,
            dial,
            button,
        }
    }
}

/// Read all three inputs.
pub fn sample<I: InputSource + ?Sized>(inputs: &mut I, analog_max: u16) -> Result<Sample> {
    let light = inputs
        .read_light()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Input)))
        .wrap_err("reading light sensor")?;
    let dial = inputs
        .read_dial()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Input)))
        .wrap_err("reading dial")?;
    let button = inputs
        .read_button()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Input)))
        .wrap_err("reading button")?;

    if light > analog_max || dial > analog_max {
        tracing::trace!(light, dial, analog_max, "clamping out-of-range reading");
    }
    Ok(Sample {
        light: light.min(analog_max),
        dial: dial.min(analog_max),
        button,
    })
}
