//! Metrics definitions for the decomposer.
//!
//! Metrics are collected using the `metrics` crate. This crate never
//! installs a recorder; embedding applications pick their own exporter.
//! Without one every call below is a no-op.

use metrics::{counter, describe_counter};

use crate::models::OperationType;
use crate::services::RecordCategory;

/// Initialize all metric descriptions.
/// Call this once at startup, after installing a recorder.
pub fn init_metrics() {
    describe_counter!(
        "records_decomposed_total",
        "Total number of records decomposed, by category"
    );
    describe_counter!(
        "operations_emitted_total",
        "Total number of operations emitted, by operation type"
    );
    describe_counter!(
        "decode_errors_total",
        "Total number of records rejected because an address failed to decode"
    );
}

/// Record a decomposed record.
pub fn record_decomposed(category: RecordCategory) {
    counter!("records_decomposed_total", "category" => category.as_str()).increment(1);
}

/// Record an emitted operation.
pub fn record_operation_emitted(operation_type: OperationType) {
    counter!("operations_emitted_total", "type" => operation_type.as_str()).increment(1);
}

/// Record a decode error.
pub fn record_decode_error() {
    counter!("decode_errors_total").increment(1);
}
