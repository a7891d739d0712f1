//! Error types for the decomposer registry.

use thiserror::Error;

use ledgerops_core::error::{ConfigError, DecodeError};

use crate::registry::DecomposerHandle;

/// Errors returned by [`crate::DecomposerRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Decomposer configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A record could not be decomposed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// No decomposer is registered under this handle.
    #[error("Unknown decomposer handle: {0}")]
    UnknownHandle(DecomposerHandle),

    /// JSON input or output could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
