//! Error types for the decomposition domain layer.
//!
//! This module defines a small hierarchy of error types:
//!
//! - [`ConfigError`] - Invalid decomposer construction arguments
//! - [`DecodeError`] - Malformed addresses met while classifying a record
//! - [`CallDataError`] - Payloads that are not well-formed contract calls
//!
//! `CallDataError` is not an error of the decomposer itself: a failed
//! call-data parse is a classification signal, never propagated.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid arguments given when constructing a decomposer.
///
/// These are fatal to the instance being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No address classifier was provided.
    #[error("nil address classifier")]
    MissingAddressClassifier,

    /// No call-data validator was provided.
    #[error("nil call-data validator")]
    MissingCallDataValidator,

    /// Minimum gas limit must be strictly positive.
    #[error("bad min gas limit: {0}")]
    BadMinGasLimit(u64),

    /// Generic invalid option.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Human-readable address could not be turned into raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Address text is not valid for the codec's encoding.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress {
        /// Offending address text.
        address: String,
        /// Codec-specific details.
        reason: String,
    },

    /// Address prefix does not match the expected chain prefix.
    #[error("wrong address prefix for {address}: expected {expected}, found {found}")]
    WrongPrefix {
        address: String,
        expected: String,
        found: String,
    },

    /// Decoded address has the wrong number of bytes.
    #[error("wrong address length for {address}: expected {expected} bytes, found {found}")]
    WrongLength {
        address: String,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Call Data Errors
// =============================================================================

/// Payload is not a syntactically valid smart-contract call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallDataError {
    /// Payload is empty.
    #[error("empty call data")]
    Empty,

    /// Payload is not UTF-8 text.
    #[error("call data is not valid utf-8")]
    NotUtf8,

    /// Function name is missing.
    #[error("empty function name")]
    EmptyFunctionName,

    /// Function name contains forbidden characters.
    #[error("invalid function name: {0:?}")]
    InvalidFunctionName(String),

    /// An argument is not an even-length hex string.
    #[error("invalid argument at position {index}: {reason}")]
    InvalidArgument {
        /// Position of the argument (0-based, function name excluded).
        index: usize,
        reason: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decomposer construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for decomposition and address decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for call-data parsing.
pub type CallDataResult<T> = Result<T, CallDataError>;
