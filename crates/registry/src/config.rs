//! Decomposer configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ledgerops_codecs::{DEFAULT_ADDRESS_HRP, DEFAULT_PUBKEY_LENGTH};

/// Textual form of account addresses in records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressEncoding {
    #[default]
    Bech32,
    /// Hex public keys, `0x` prefix optional.
    Hex,
}

impl AddressEncoding {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bech32 => "bech32",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for AddressEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bech32" => Ok(Self::Bech32),
            "hex" => Ok(Self::Hex),
            other => Err(format!("unknown address encoding '{other}' (expected bech32 or hex)")),
        }
    }
}

/// Configuration of one decomposer instance.
///
/// Deserializes from camelCase JSON:
///
/// ```json
/// { "minGasLimit": 50000, "gasLimitPerByte": 1500, "pubkeyLength": 32, "addressEncoding": "bech32" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposerConfig {
    pub min_gas_limit: u64,
    #[serde(default)]
    pub gas_limit_per_byte: u64,
    #[serde(default = "default_pubkey_length")]
    pub pubkey_length: usize,
    #[serde(default)]
    pub address_encoding: AddressEncoding,
    /// Prefix of bech32 addresses, ignored for hex.
    #[serde(default = "default_address_hrp")]
    pub address_hrp: String,
}

impl DecomposerConfig {
    pub fn new(min_gas_limit: u64, gas_limit_per_byte: u64) -> Self {
        Self {
            min_gas_limit,
            gas_limit_per_byte,
            pubkey_length: DEFAULT_PUBKEY_LENGTH,
            address_encoding: AddressEncoding::default(),
            address_hrp: DEFAULT_ADDRESS_HRP.to_string(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn default_pubkey_length() -> usize {
    DEFAULT_PUBKEY_LENGTH
}

fn default_address_hrp() -> String {
    DEFAULT_ADDRESS_HRP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DecomposerConfig::from_json(r#"{"minGasLimit": 50000}"#).unwrap();
        assert_eq!(config, DecomposerConfig::new(50000, 0));
        assert_eq!(config.pubkey_length, 32);
        assert_eq!(config.address_hrp, "erd");
        assert_eq!(config.address_encoding, AddressEncoding::Bech32);
    }

    #[test]
    fn test_config_full() {
        let config = DecomposerConfig::from_json(
            r#"{"minGasLimit": 1, "gasLimitPerByte": 2, "pubkeyLength": 20, "addressHrp": "tst"}"#,
        )
        .unwrap();
        assert_eq!(config.gas_limit_per_byte, 2);
        assert_eq!(config.pubkey_length, 20);
        assert_eq!(config.address_hrp, "tst");
    }

    #[test]
    fn test_address_encoding() {
        let config =
            DecomposerConfig::from_json(r#"{"minGasLimit": 1, "addressEncoding": "hex"}"#).unwrap();
        assert_eq!(config.address_encoding, AddressEncoding::Hex);
        assert!(
            DecomposerConfig::from_json(r#"{"minGasLimit": 1, "addressEncoding": "base58"}"#)
                .is_err()
        );

        assert_eq!("HEX".parse::<AddressEncoding>(), Ok(AddressEncoding::Hex));
        assert!("base58".parse::<AddressEncoding>().is_err());
        assert_eq!(AddressEncoding::Bech32.to_string(), "bech32");
    }

    // minGasLimit est obligatoire
    #[test]
    fn test_config_requires_min_gas_limit() {
        assert!(DecomposerConfig::from_json(r#"{"gasLimitPerByte": 1500}"#).is_err());
    }
}
