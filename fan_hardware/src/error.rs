use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("adc channel {0} out of range (0..=7)")]
    AdcChannel(u8),
    #[error("store address {address} out of range (size {size})")]
    StoreAddress { address: u16, size: u16 },
    #[error("servo angle {0} out of range (0..=180)")]
    ServoAngle(u8),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
