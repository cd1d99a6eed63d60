//! Maps `Box<dyn Error>` from trait boundaries to typed `FanError`.
//!
//! The traits in `fan_traits` use `Box<dyn Error + Send + Sync>`; this module
//! turns those into our error enum, with an optional feature-gated path for
//! `fan_hardware::HwError` downcasting.

use crate::error::FanError;

/// Which collaborator produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Input,
    Actuator,
    Store,
}

impl Origin {
    fn wrap(self, msg: String) -> FanError {
        match self {
            Origin::Input => FanError::Input(msg),
            Origin::Actuator => FanError::Actuator(msg),
            Origin::Store => FanError::Store(msg),
        }
    }
}

/// Map a trait-boundary error to a typed `FanError`.
///
/// Known hardware errors carry their own origin; anything else is attributed
/// to the collaborator that was being called.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static), origin: Origin) -> FanError {
    #[cfg(feature = "hardware-errors")]
    {
        use fan_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            let msg = hw.to_string();
            return match hw {
                HwError::StoreAddress { .. } => FanError::Store(msg),
                HwError::ServoAngle(_) | HwError::Pwm(_) => FanError::Actuator(msg),
                HwError::AdcChannel(_) | HwError::Spi(_) => FanError::Input(msg),
                HwError::Gpio(_) | HwError::Io(_) => origin.wrap(msg),
            };
        }
    }

    origin.wrap(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_errors_follow_origin() {
        let e = std::io::Error::other("bus stuck");
        assert_eq!(
            map_hw_error(&e, Origin::Input),
            FanError::Input("bus stuck".into())
        );
        assert_eq!(
            map_hw_error(&e, Origin::Store),
            FanError::Store("bus stuck".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hardware_errors_keep_their_origin() {
        use fan_hardware::error::HwError;
        let e = HwError::StoreAddress {
            address: 9,
            size: 8,
        };
        match map_hw_error(&e, Origin::Actuator) {
            FanError::Store(msg) => assert!(msg.contains("address 9")),
            other => panic!("unexpected: {other:?}"),
        }
        let e = HwError::Gpio("busy".into());
        assert!(matches!(map_hw_error(&e, Origin::Input), FanError::Input(_)));
    }
}
