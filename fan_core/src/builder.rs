//! Type-state builder for `FanController` and generic `build_controller` constructor.
//!
//! The builder enforces at compile time that inputs, actuator and store are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;

use eyre::WrapErr;
use fan_traits::{ActuatorSink, InputSource, PersistentStore};

use crate::config::{CadenceCfg, MappingCfg, StoreCfg};
use crate::controller::{ControllerCore, ControllerState};
use crate::diagnostics::DiagnosticSink;
use crate::error::{BuildError, Result};
use crate::status::ControllerStats;
use crate::threshold_store::load_threshold;

/// Highest servo angle a hobby servo accepts.
pub const MAX_SERVO_ANGLE: u8 = 180;

/// Dynamically dispatched controller, as assembled by `ControllerBuilder`.
pub type FanController =
    ControllerCore<Box<dyn InputSource>, Box<dyn ActuatorSink>, Box<dyn PersistentStore>>;

impl FanController {
    /// Start building a controller.
    pub fn builder() -> ControllerBuilder<Missing, Missing, Missing> {
        ControllerBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `FanController`. All fields are validated on `build()`.
pub struct ControllerBuilder<I, A, P> {
    inputs: Option<Box<dyn InputSource>>,
    actuator: Option<Box<dyn ActuatorSink>>,
    store: Option<Box<dyn PersistentStore>>,
    mapping: Option<MappingCfg>,
    cadence: Option<CadenceCfg>,
    store_cfg: Option<StoreCfg>,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
    _i: PhantomData<I>,
    _a: PhantomData<A>,
    _p: PhantomData<P>,
}

impl Default for ControllerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            inputs: None,
            actuator: None,
            store: None,
            mapping: None,
            cadence: None,
            store_cfg: None,
            diagnostics: None,
            _i: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration, load the stored threshold and construct a
/// `ControllerCore`.
///
/// Shared by `ControllerBuilder::try_build()` and `build_controller()`.
fn validate_and_build<I, A, P>(
    inputs: I,
    actuator: A,
    mut store: P,
    mapping: MappingCfg,
    cadence: CadenceCfg,
    store_cfg: StoreCfg,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
) -> Result<ControllerCore<I, A, P>>
where
    I: InputSource,
    A: ActuatorSink,
    P: PersistentStore,
{
    // ── Validation ───────────────────────────────────────────────────────────
    if cadence.sample_rate_hz == 0 {
        return Err(invalid("sample_rate_hz must be > 0"));
    }
    if cadence.update_every == 0 {
        return Err(invalid("update_every must be >= 1"));
    }
    if mapping.analog_max == 0 {
        return Err(invalid("analog_max must be >= 1"));
    }
    if mapping.dial_threshold >= mapping.analog_max {
        return Err(invalid("dial_threshold must be < analog_max"));
    }
    if mapping.pos_min > mapping.pos_max {
        return Err(invalid("pos_min must be <= pos_max"));
    }
    if mapping.pos_max > MAX_SERVO_ANGLE {
        return Err(invalid("pos_max must be <= 180"));
    }
    if store_cfg.address == u16::MAX {
        return Err(invalid("store address must leave room for two bytes"));
    }

    // ── Restore ──────────────────────────────────────────────────────────────
    let stored = load_threshold(&mut store, store_cfg.address)
        .wrap_err("loading stored threshold")?;
    let threshold = if stored > mapping.analog_max {
        tracing::warn!(
            stored,
            analog_max = mapping.analog_max,
            "stored threshold out of range; clamping"
        );
        mapping.analog_max
    } else {
        stored
    };
    tracing::debug!(threshold, address = store_cfg.address, "threshold restored");

    Ok(ControllerCore {
        inputs,
        actuator,
        store,
        mapping,
        cadence,
        store_cfg,
        state: ControllerState::with_threshold(threshold),
        diagnostics,
        stats: ControllerStats::default(),
    })
}

impl<I, A, P> ControllerBuilder<I, A, P> {
    /// Fallible build available in any type-state; returns a detailed error for missing pieces.
    pub fn try_build(self) -> Result<FanController> {
        let inputs = self
            .inputs
            .ok_or_else(|| eyre::Report::new(BuildError::MissingInputs))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;

        validate_and_build(
            inputs,
            actuator,
            store,
            self.mapping.unwrap_or_default(),
            self.cadence.unwrap_or_default(),
            self.store_cfg.unwrap_or_default(),
            self.diagnostics,
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<I, A, P> ControllerBuilder<I, A, P> {
    pub fn with_mapping(mut self, mapping: MappingCfg) -> Self {
        self.mapping = Some(mapping);
        self
    }
    pub fn with_cadence(mut self, cadence: CadenceCfg) -> Self {
        self.cadence = Some(cadence);
        self
    }
    pub fn with_store_cfg(mut self, store_cfg: StoreCfg) -> Self {
        self.store_cfg = Some(store_cfg);
        self
    }
    /// Attach a diagnostic sink; without one, ticks are silent.
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }
}

// Setters that advance type-state
impl<A, P> ControllerBuilder<Missing, A, P> {
    pub fn with_inputs(self, inputs: impl InputSource + 'static) -> ControllerBuilder<Set, A, P> {
        ControllerBuilder {
            inputs: Some(Box::new(inputs)),
            actuator: self.actuator,
            store: self.store,
            mapping: self.mapping,
            cadence: self.cadence,
            store_cfg: self.store_cfg,
            diagnostics: self.diagnostics,
            _i: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<I, P> ControllerBuilder<I, Missing, P> {
    pub fn with_actuator(
        self,
        actuator: impl ActuatorSink + 'static,
    ) -> ControllerBuilder<I, Set, P> {
        ControllerBuilder {
            inputs: self.inputs,
            actuator: Some(Box::new(actuator)),
            store: self.store,
            mapping: self.mapping,
            cadence: self.cadence,
            store_cfg: self.store_cfg,
            diagnostics: self.diagnostics,
            _i: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<I, A> ControllerBuilder<I, A, Missing> {
    pub fn with_store(self, store: impl PersistentStore + 'static) -> ControllerBuilder<I, A, Set> {
        ControllerBuilder {
            inputs: self.inputs,
            actuator: self.actuator,
            store: Some(Box::new(store)),
            mapping: self.mapping,
            cadence: self.cadence,
            store_cfg: self.store_cfg,
            diagnostics: self.diagnostics,
            _i: PhantomData,
            _a: PhantomData,
            _p: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set, Set> {
    /// Validate and build. Only available once inputs, actuator and store are set.
    pub fn build(self) -> Result<FanController> {
        self.try_build()
    }
}

/// Build a statically dispatched controller from concrete collaborators.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_controller<I, A, P>(
    inputs: I,
    actuator: A,
    store: P,
    mapping: MappingCfg,
    cadence: CadenceCfg,
    store_cfg: StoreCfg,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
) -> Result<ControllerCore<I, A, P>>
where
    I: InputSource,
    A: ActuatorSink,
    P: PersistentStore,
{
    validate_and_build(
        inputs,
        actuator,
        store,
        mapping,
        cadence,
        store_cfg,
        diagnostics,
    )
}
