//! Port trait for smart-contract call-data parsing.

use crate::error::CallDataResult;

/// A payload recognised as a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    /// Called function name.
    pub function: String,
    /// Decoded arguments, in order.
    pub arguments: Vec<Vec<u8>>,
}

/// Parses a record payload as a smart-contract call.
///
/// A failure means the payload is not a function call (e.g. a plain memo).
pub trait CallDataValidator: Send + Sync {
    fn parse_call(&self, payload: &[u8]) -> CallDataResult<ParsedCall>;

    /// Convenience wrapper around [`CallDataValidator::parse_call`].
    fn is_valid_call(&self, payload: &[u8]) -> bool {
        self.parse_call(payload).is_ok()
    }
}
