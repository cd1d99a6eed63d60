//! `From` implementations bridging `fan_config` types to `fan_core` types.

use crate::config::{CadenceCfg, MappingCfg, StoreCfg};

impl From<&fan_config::Cadence> for CadenceCfg {
    fn from(c: &fan_config::Cadence) -> Self {
        Self {
            sample_rate_hz: c.sample_rate_hz,
            update_every: c.update_every(),
        }
    }
}

impl From<&fan_config::Mapping> for MappingCfg {
    fn from(c: &fan_config::Mapping) -> Self {
        Self {
            analog_max: c.analog_max,
            dial_threshold: c.dial_threshold,
            pos_min: c.pos_min,
            pos_max: c.pos_max,
        }
    }
}

impl From<&fan_config::Store> for StoreCfg {
    fn from(c: &fan_config::Store) -> Self {
        Self { address: c.address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_with_schema_defaults() {
        let cfg = fan_config::Config::default();
        assert_eq!(CadenceCfg::from(&cfg.cadence), CadenceCfg::default());
        assert_eq!(MappingCfg::from(&cfg.mapping), MappingCfg::default());
        assert_eq!(StoreCfg::from(&cfg.store), StoreCfg::default());
    }
}
