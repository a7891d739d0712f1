//! Address codecs.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use tracing::trace;

use ledgerops_core::error::{ConfigError, ConfigResult, DecodeError, DecodeResult};
use ledgerops_core::ports::AddressClassifier;

/// Human-readable prefix of mainnet addresses.
pub const DEFAULT_ADDRESS_HRP: &str = "erd";

/// Length of an account public key in bytes.
pub const DEFAULT_PUBKEY_LENGTH: usize = 32;

// =============================================================================
// Bech32
// =============================================================================

/// Bech32 address codec with a fixed prefix and public key length.
#[derive(Debug, Clone)]
pub struct Bech32AddressCodec {
    hrp: Hrp,
    pubkey_len: usize,
}

impl Bech32AddressCodec {
    pub fn new(hrp: &str, pubkey_len: usize) -> ConfigResult<Self> {
        if pubkey_len == 0 {
            return Err(ConfigError::Invalid("pubkey length must be > 0".into()));
        }
        let hrp = Hrp::parse(hrp)
            .map_err(|e| ConfigError::Invalid(format!("bad address prefix {hrp:?}: {e}")))?;

        Ok(Self { hrp, pubkey_len })
    }

    pub fn hrp(&self) -> &str {
        self.hrp.as_str()
    }

    pub fn pubkey_len(&self) -> usize {
        self.pubkey_len
    }

    /// Encode raw public key bytes.
    pub fn encode(&self, pubkey: &[u8]) -> DecodeResult<String> {
        if pubkey.len() != self.pubkey_len {
            return Err(DecodeError::WrongLength {
                address: hex::encode(pubkey),
                expected: self.pubkey_len,
                found: pubkey.len(),
            });
        }

        bech32::encode::<Bech32>(self.hrp, pubkey).map_err(|e| DecodeError::InvalidAddress {
            address: hex::encode(pubkey),
            reason: e.to_string(),
        })
    }
}

impl AddressClassifier for Bech32AddressCodec {
    fn decode(&self, address: &str) -> DecodeResult<Vec<u8>> {
        // Bech32 checksum only, bech32m strings are rejected
        let checked = CheckedHrpstring::new::<Bech32>(address).map_err(|e| {
            trace!(address, error = %e, "Bech32 decoding failed");
            DecodeError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })?;
        let hrp = checked.hrp();
        let pubkey: Vec<u8> = checked.byte_iter().collect();

        if !hrp.as_str().eq_ignore_ascii_case(self.hrp.as_str()) {
            return Err(DecodeError::WrongPrefix {
                address: address.to_string(),
                expected: self.hrp.to_string(),
                found: hrp.to_string(),
            });
        }
        if pubkey.len() != self.pubkey_len {
            return Err(DecodeError::WrongLength {
                address: address.to_string(),
                expected: self.pubkey_len,
                found: pubkey.len(),
            });
        }

        Ok(pubkey)
    }
}

// =============================================================================
// Hex
// =============================================================================

/// Hex address codec (`0x` prefix optional).
#[derive(Debug, Clone)]
pub struct HexAddressCodec {
    pubkey_len: usize,
}

impl HexAddressCodec {
    pub fn new(pubkey_len: usize) -> ConfigResult<Self> {
        if pubkey_len == 0 {
            return Err(ConfigError::Invalid("pubkey length must be > 0".into()));
        }

        Ok(Self { pubkey_len })
    }
}

impl Default for HexAddressCodec {
    fn default() -> Self {
        Self {
            pubkey_len: DEFAULT_PUBKEY_LENGTH,
        }
    }
}

impl AddressClassifier for HexAddressCodec {
    fn decode(&self, address: &str) -> DecodeResult<Vec<u8>> {
        let hex_str = address.strip_prefix("0x").unwrap_or(address);
        let pubkey = hex::decode(hex_str).map_err(|e| DecodeError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        if pubkey.len() != self.pubkey_len {
            return Err(DecodeError::WrongLength {
                address: address.to_string(),
                expected: self.pubkey_len,
                found: pubkey.len(),
            });
        }

        Ok(pubkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_pubkey() -> [u8; 32] {
        let mut pubkey = [0u8; 32];
        pubkey[8] = 0x05;
        pubkey[30] = 0x01;
        pubkey[31] = 0x02;
        pubkey
    }

    #[test]
    fn test_bech32_roundtrip_and_classification() {
        let codec = Bech32AddressCodec::new("erd", 32).unwrap();

        let contract = codec.encode(&contract_pubkey()).unwrap();
        assert!(contract.starts_with("erd1qqqqqqqqqqqqq"));
        let decoded = codec.decode(&contract).unwrap();
        assert_eq!(decoded, contract_pubkey());
        assert!(codec.is_smart_contract(&decoded));

        let user = codec.encode(&[0x42; 32]).unwrap();
        let decoded = codec.decode(&user).unwrap();
        assert!(!codec.is_smart_contract(&decoded));
    }

    // Adresses réelles du devnet utilisées pour la réconciliation
    #[test]
    fn test_bech32_decodes_known_addresses() {
        let codec = Bech32AddressCodec::new(DEFAULT_ADDRESS_HRP, DEFAULT_PUBKEY_LENGTH).unwrap();
        for address in [
            "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th",
            "erd1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqzu66jx",
        ] {
            let pubkey = codec.decode(address).unwrap();
            assert_eq!(pubkey.len(), 32);
            assert_eq!(codec.encode(&pubkey).unwrap(), address);
        }
    }

    #[test]
    fn test_bech32_rejects_bad_checksum() {
        let codec = Bech32AddressCodec::new("erd", 32).unwrap();
        let result = codec.decode("erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6tq");
        assert!(matches!(result, Err(DecodeError::InvalidAddress { .. })));
        assert!(codec.decode("not an address").is_err());
    }

    #[test]
    fn test_bech32_rejects_bech32m_checksum() {
        let hrp = Hrp::parse("erd").unwrap();
        let address = bech32::encode::<bech32::Bech32m>(hrp, &[0x42; 32]).unwrap();

        let codec = Bech32AddressCodec::new("erd", 32).unwrap();
        assert!(matches!(
            codec.decode(&address),
            Err(DecodeError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_bech32_rejects_wrong_prefix() {
        let other = Bech32AddressCodec::new("xyz", 32).unwrap();
        let address = other.encode(&[0x42; 32]).unwrap();

        let codec = Bech32AddressCodec::new("erd", 32).unwrap();
        assert!(matches!(
            codec.decode(&address),
            Err(DecodeError::WrongPrefix { .. })
        ));
    }

    #[test]
    fn test_bech32_rejects_wrong_length() {
        let short = Bech32AddressCodec::new("erd", 20).unwrap();
        let address = short.encode(&[0x42; 20]).unwrap();

        let codec = Bech32AddressCodec::new("erd", 32).unwrap();
        assert!(matches!(
            codec.decode(&address),
            Err(DecodeError::WrongLength { expected: 32, found: 20, .. })
        ));
    }

    #[test]
    fn test_bech32_rejects_bad_config() {
        assert!(Bech32AddressCodec::new("erd", 0).is_err());
        assert!(Bech32AddressCodec::new("", 32).is_err());
    }

    #[test]
    fn test_hex_codec() {
        let codec = HexAddressCodec::default();
        let hex = "0x".to_string() + &"00".repeat(8) + &"05".repeat(24);

        let pubkey = codec.decode(&hex).unwrap();
        assert!(codec.is_smart_contract(&pubkey));

        let pubkey = codec.decode(&"ab".repeat(32)).unwrap();
        assert!(!codec.is_smart_contract(&pubkey));

        assert!(matches!(
            codec.decode("0x1234"),
            Err(DecodeError::WrongLength { .. })
        ));
        assert!(matches!(
            codec.decode("not_hex"),
            Err(DecodeError::InvalidAddress { .. })
        ));

        assert!(HexAddressCodec::new(0).is_err());
        let short = HexAddressCodec::new(20).unwrap();
        assert_eq!(short.decode(&"ab".repeat(20)).unwrap().len(), 20);
    }
}
