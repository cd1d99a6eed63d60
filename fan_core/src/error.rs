use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FanError {
    #[error("input error: {0}")]
    Input(String),
    #[error("actuator error: {0}")]
    Actuator(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing inputs")]
    MissingInputs,
    #[error("missing actuator")]
    MissingActuator,
    #[error("missing store")]
    MissingStore,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
