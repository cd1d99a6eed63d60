#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Light-gated fan control logic (hardware-agnostic).
//!
//! All hardware interactions go through the `fan_traits::InputSource`,
//! `fan_traits::ActuatorSink` and `fan_traits::PersistentStore` traits.
//!
//! ## Architecture
//!
//! - **Sampling**: light, dial and button read once per cycle (`sampler`)
//! - **Calibration**: button-edge threshold recalibration (`calibration`)
//! - **Persistence**: big-endian threshold codec with update-only writes (`threshold_store`)
//! - **Mapping**: dial-to-servo map gated by light (`mapper`)
//! - **Cadence**: actuator and diagnostics every N cycles (`cadence`)
//! - **Control**: `ControllerState::advance` decides, `ControllerCore::step` acts (`controller`)
//! - **Diagnostics**: injected sinks for per-tick snapshots (`diagnostics`)
//! - **Driver**: fixed-period loop over an injected clock (`runner`)

pub mod builder;
pub mod cadence;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod diagnostics;
pub mod error;
pub mod hw_error;
pub mod mapper;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod threshold_store;
pub mod util;

pub use builder::{ControllerBuilder, FanController, Missing, Set, build_controller};
pub use cadence::Cadence;
pub use calibration::{recalibrated_threshold, rising_edge};
pub use config::{CadenceCfg, MappingCfg, StoreCfg};
pub use controller::{ControllerCore, ControllerState, CycleDecision};
pub use diagnostics::{DiagnosticSink, FileSink, MemorySink, Snapshot, TracingSink, WriterSink};
pub use error::{BuildError, FanError, Report, Result};
pub use mapper::{actuator_target, map_range};
pub use runner::{RunOptions, RunSummary, StopReason, run};
pub use sampler::Sample;
pub use status::{ControllerStats, CycleReport};
pub use threshold_store::{load_threshold, save_threshold};
