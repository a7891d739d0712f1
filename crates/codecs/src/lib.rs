//! Chain codecs for ledgerops.
//!
//! This crate implements the ports defined in `ledgerops-core`:
//!
//! - [`Bech32AddressCodec`] and [`HexAddressCodec`] implement
//!   [`AddressClassifier`](ledgerops_core::ports::AddressClassifier)
//! - [`CallArgsParser`] implements
//!   [`CallDataValidator`](ledgerops_core::ports::CallDataValidator)
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use ledgerops_codecs::{Bech32AddressCodec, CallArgsParser};
//! use ledgerops_core::services::{OperationDecomposer, OperationDecomposerArgs};
//!
//! let decomposer = OperationDecomposer::new(OperationDecomposerArgs {
//!     address_classifier: Some(Arc::new(Bech32AddressCodec::new("erd", 32)?)),
//!     call_data_validator: Some(Arc::new(CallArgsParser::new())),
//!     min_gas_limit: 50_000,
//!     gas_limit_per_byte: 1_500,
//! })?;
//! ```

mod address;
mod call_args;

pub use address::{Bech32AddressCodec, DEFAULT_ADDRESS_HRP, DEFAULT_PUBKEY_LENGTH, HexAddressCodec};
pub use call_args::{ARGUMENTS_SEPARATOR, CallArgsParser};
