//! Core domain layer for ledgerops.
//!
//! This crate classifies indexed transfer records of a sharded chain and
//! decomposes each one into balance-changing operations (fees, native
//! transfers, rewards) for downstream reconciliation. It follows hexagonal
//! architecture principles - this is the innermost layer, address codecs
//! and call-data parsers are plugged in through ports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ledgerops (binary)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │        ledgerops-registry        │     ledgerops-codecs     │
//! │  (handle store, JSON boundary)   │ (bech32/hex, call args)  │
//! ├──────────────────────────────────┴──────────────────────────┤
//! │                  ledgerops-core  ← YOU ARE HERE             │
//! │       (models, ports, amount, decomposer, reconciliation)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Input records, operations and their tags
//! - [`ports`] - Collaborator traits (address classifier, call-data validator)
//! - [`services`] - Decomposer and balance reconciliation
//! - [`amount`] - Decimal-string amount helpers
//! - [`error`] - Domain error types
//! - [`metrics`] - Metric definitions
//!
//! # Decomposition
//!
//! [`services::OperationDecomposer::decompose`] evaluates five categories in
//! priority order (staking reward, invalid, smart-contract result, value sent
//! to a non-payable contract, regular) and emits the operations of the first
//! one that matches.

pub mod amount;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
