//! Caller-owned store of configured decomposers.
//!
//! Embedders that cannot hold a Rust value across calls (scripting bridges,
//! worker pools fed with JSON) create a decomposer once, keep the opaque
//! [`DecomposerHandle`], and decompose JSON records against it.
//!
//! # Usage
//!
//! ```ignore
//! use ledgerops_registry::DecomposerRegistry;
//!
//! let registry = DecomposerRegistry::new();
//! let handle = registry.create_from_json(r#"{"minGasLimit": 50000, "gasLimitPerByte": 1500}"#)?;
//! let operations_json = registry.decompose_json(handle, record_json)?;
//! ```

mod config;
mod error;
mod registry;

pub use config::{AddressEncoding, DecomposerConfig};
pub use error::{RegistryError, RegistryResult};
pub use registry::{DecomposerHandle, DecomposerRegistry};
