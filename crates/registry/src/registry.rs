//! Handle-keyed registry of decomposers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use ledgerops_codecs::{Bech32AddressCodec, CallArgsParser, HexAddressCodec};
use ledgerops_core::models::{Operation, TransferRecord};
use ledgerops_core::ports::AddressClassifier;
use ledgerops_core::services::{OperationDecomposer, OperationDecomposerArgs};

use crate::config::{AddressEncoding, DecomposerConfig};
use crate::error::{RegistryError, RegistryResult};

/// Opaque identifier of a registered decomposer.
///
/// Handles are never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecomposerHandle(u64);

impl From<u64> for DecomposerHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for DecomposerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry for configured decomposers.
///
/// Creation and lookup may race freely; the map is guarded by a
/// read-write lock and decomposers are shared as `Arc`s, so a lookup never
/// holds the lock while decomposing.
///
/// # Example
///
/// ```ignore
/// let registry = DecomposerRegistry::new();
/// let handle = registry.create(DecomposerConfig::new(50_000, 1_500))?;
/// let operations = registry.decompose(handle, &record)?;
/// ```
pub struct DecomposerRegistry {
    decomposers: RwLock<HashMap<DecomposerHandle, Arc<OperationDecomposer>>>,
    next_handle: AtomicU64,
}

impl DecomposerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            decomposers: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Build a decomposer with the configured address codec and `@` call data.
    pub fn create(&self, config: DecomposerConfig) -> RegistryResult<DecomposerHandle> {
        let address_classifier = address_classifier(&config)?;
        let decomposer = OperationDecomposer::new(OperationDecomposerArgs {
            address_classifier: Some(address_classifier),
            call_data_validator: Some(Arc::new(CallArgsParser::new())),
            min_gas_limit: config.min_gas_limit,
            gas_limit_per_byte: config.gas_limit_per_byte,
        })?;

        let handle = self.insert(decomposer);
        info!(
            handle = %handle,
            min_gas_limit = config.min_gas_limit,
            gas_limit_per_byte = config.gas_limit_per_byte,
            encoding = %config.address_encoding,
            "Registered decomposer"
        );
        Ok(handle)
    }

    /// Parse a JSON [`DecomposerConfig`] and build a decomposer from it.
    pub fn create_from_json(&self, config_json: &str) -> RegistryResult<DecomposerHandle> {
        let config = DecomposerConfig::from_json(config_json).inspect_err(|e| {
            warn!(error = %e, "Cannot unmarshal decomposer config");
        })?;
        self.create(config)
    }

    /// Register an already built decomposer (custom collaborators).
    pub fn insert(&self, decomposer: OperationDecomposer) -> DecomposerHandle {
        let handle = DecomposerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.decomposers.write().insert(handle, Arc::new(decomposer));
        handle
    }

    pub fn get(&self, handle: DecomposerHandle) -> RegistryResult<Arc<OperationDecomposer>> {
        self.decomposers
            .read()
            .get(&handle)
            .cloned()
            .ok_or(RegistryError::UnknownHandle(handle))
    }

    /// Drop a decomposer. Returns `false` if the handle was unknown.
    pub fn remove(&self, handle: DecomposerHandle) -> bool {
        let removed = self.decomposers.write().remove(&handle).is_some();
        if removed {
            debug!(handle = %handle, "Removed decomposer");
        }
        removed
    }

    pub fn decompose(
        &self,
        handle: DecomposerHandle,
        record: &TransferRecord,
    ) -> RegistryResult<Vec<Operation>> {
        let decomposer = self.get(handle)?;
        Ok(decomposer.decompose(record)?)
    }

    /// Decompose a JSON record and return the operations as a JSON array.
    pub fn decompose_json(
        &self,
        handle: DecomposerHandle,
        record_json: &str,
    ) -> RegistryResult<String> {
        let record: TransferRecord = serde_json::from_str(record_json).inspect_err(|e| {
            warn!(handle = %handle, error = %e, "Cannot unmarshal transfer");
        })?;

        let operations = self.decompose(handle, &record).inspect_err(|e| {
            warn!(handle = %handle, tx = %record.hash, error = %e, "Cannot decompose transfer");
        })?;

        Ok(serde_json::to_string(&operations)?)
    }

    /// Get the number of registered decomposers.
    pub fn len(&self) -> usize {
        self.decomposers.read().len()
    }

    /// Check if no decomposers are registered.
    pub fn is_empty(&self) -> bool {
        self.decomposers.read().is_empty()
    }
}

fn address_classifier(config: &DecomposerConfig) -> RegistryResult<Arc<dyn AddressClassifier>> {
    match config.address_encoding {
        AddressEncoding::Bech32 => {
            let codec = Bech32AddressCodec::new(&config.address_hrp, config.pubkey_length)?;
            debug!(hrp = codec.hrp(), pubkey_len = codec.pubkey_len(), "Bech32 addresses");
            Ok(Arc::new(codec))
        }
        AddressEncoding::Hex => {
            let codec = HexAddressCodec::new(config.pubkey_length)?;
            debug!(pubkey_len = config.pubkey_length, "Hex addresses");
            Ok(Arc::new(codec))
        }
    }
}

impl Default for DecomposerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
