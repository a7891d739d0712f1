//! Port trait for address codecs.
//!
//! The decomposer only needs to know whether a receiver is a smart-contract
//! account. Implementations live in the adapter layer (e.g. `ledgerops-codecs`).

use crate::error::DecodeResult;

/// Number of leading bytes reserved for the smart-contract marker and VM type.
pub const NUM_INIT_CHARACTERS_FOR_SC_ADDRESS: usize = 10;

/// Length of the VM type suffix inside the reserved prefix.
pub const VM_TYPE_LEN: usize = 2;

/// Converts human-readable addresses to raw public-key bytes.
pub trait AddressClassifier: Send + Sync {
    /// Decode a human-readable address.
    fn decode(&self, address: &str) -> DecodeResult<Vec<u8>>;

    /// Whether decoded address bytes belong to a smart-contract account.
    ///
    /// Defaults to the chain convention, see [`is_smart_contract_address`].
    fn is_smart_contract(&self, pubkey: &[u8]) -> bool {
        is_smart_contract_address(pubkey)
    }
}

/// Chain convention for smart-contract addresses.
///
/// Contract addresses start with `NUM_INIT_CHARACTERS_FOR_SC_ADDRESS - VM_TYPE_LEN`
/// zero bytes, followed by the VM type. Addresses that are too short are
/// never contracts.
pub fn is_smart_contract_address(pubkey: &[u8]) -> bool {
    if pubkey.len() <= NUM_INIT_CHARACTERS_FOR_SC_ADDRESS {
        return false;
    }

    pubkey[..NUM_INIT_CHARACTERS_FOR_SC_ADDRESS - VM_TYPE_LEN]
        .iter()
        .all(|byte| *byte == 0)
}
