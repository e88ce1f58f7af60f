use driver_udc::{endp_is_in, endp_num};
use serde::{Deserialize, Serialize};

use crate::descriptor::{
    ConfigAttributes, DEFAULT_IN_ENDPOINT, DEFAULT_INTERFACE_NUMBER, DEFAULT_OUT_ENDPOINT,
    DEFAULT_STRING_INDEX,
};
use crate::error::{PrinterError, Result};

/// Layout compiled into the driver, used when the embedder supplies none.
pub const DEFAULT_CONFIG: &str = include_str!("../printer.toml");

/// USB2 9.6.3 caps bMaxPower at 250 units of 2 mA.
pub const MAX_POWER_LIMIT_MA: u16 = 500;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub interface_number: u8,
    pub in_endpoint: u8,
    pub out_endpoint: u8,
    pub string_index: u8,
    pub self_powered: bool,
    pub remote_wakeup: bool,
    pub max_power_ma: u16,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            interface_number: DEFAULT_INTERFACE_NUMBER,
            in_endpoint: DEFAULT_IN_ENDPOINT,
            out_endpoint: DEFAULT_OUT_ENDPOINT,
            string_index: DEFAULT_STRING_INDEX,
            self_powered: false,
            remote_wakeup: false,
            max_power_ma: 100,
        }
    }
}

impl PrinterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    pub fn validate(&self) -> Result<()> {
        if !endp_is_in(self.in_endpoint) || endp_num(self.in_endpoint) == 0 {
            return Err(PrinterError::InvalidConfig("in_endpoint must be an IN endpoint 1-15"));
        }
        if endp_is_in(self.out_endpoint) || endp_num(self.out_endpoint) == 0 {
            return Err(PrinterError::InvalidConfig("out_endpoint must be an OUT endpoint 1-15"));
        }
        // Reserved bits 6:4 must be zero.
        if self.in_endpoint & 0x70 != 0 || self.out_endpoint & 0x70 != 0 {
            return Err(PrinterError::InvalidConfig("endpoint address has reserved bits set"));
        }
        if self.max_power_ma > MAX_POWER_LIMIT_MA {
            return Err(PrinterError::InvalidConfig("max_power_ma exceeds 500"));
        }
        Ok(())
    }

    pub fn attributes(&self) -> ConfigAttributes {
        let mut attributes = ConfigAttributes::RESERVED_ONE;
        attributes.set(ConfigAttributes::SELF_POWERED, self.self_powered);
        attributes.set(ConfigAttributes::REMOTE_WAKEUP, self.remote_wakeup);
        attributes
    }

    /// bMaxPower, rounded up to the next 2 mA unit.
    pub fn max_power(&self) -> u8 {
        u8::try_from(self.max_power_ma.div_ceil(2)).unwrap_or(u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_defaults() {
        assert_eq!(PrinterConfig::embedded().unwrap(), PrinterConfig::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config =
            PrinterConfig::from_toml_str("interface_number = 3\nself_powered = true\n").unwrap();
        assert_eq!(config.interface_number, 3);
        assert_eq!(config.in_endpoint, DEFAULT_IN_ENDPOINT);
        assert_eq!(
            config.attributes(),
            ConfigAttributes::RESERVED_ONE | ConfigAttributes::SELF_POWERED
        );
    }

    #[test]
    fn rejects_wrong_direction() {
        let err = PrinterConfig::from_toml_str("in_endpoint = 2\n").unwrap_err();
        assert!(matches!(err, PrinterError::InvalidConfig(_)));
        let err = PrinterConfig::from_toml_str("out_endpoint = 130\n").unwrap_err();
        assert!(matches!(err, PrinterError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_excess_power_and_bad_toml() {
        let err = PrinterConfig::from_toml_str("max_power_ma = 900\n").unwrap_err();
        assert!(matches!(err, PrinterError::InvalidConfig(_)));
        let err = PrinterConfig::from_toml_str("interface_number = \"one\"\n").unwrap_err();
        assert!(matches!(err, PrinterError::Toml(_)));
    }

    #[test]
    fn max_power_units() {
        let mut config = PrinterConfig::default();
        assert_eq!(config.max_power(), 50);
        config.max_power_ma = 500;
        assert_eq!(config.max_power(), 250);
        config.max_power_ma = 1;
        assert_eq!(config.max_power(), 1);
    }
}
