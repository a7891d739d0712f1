//! Decomposition of transfer records into balance-changing operations.
//!
//! Each record falls into exactly one [`RecordCategory`]. Categories are
//! tested in a fixed priority order; the first match decides which
//! operations are emitted.
//!
//! | priority | category | fee | transfer pair |
//! |---|---|---|---|
//! | 1 | staking reward | none | single reward credit |
//! | 2 | invalid | record fee | failed |
//! | 3 | smart-contract result | none | successful |
//! | 4 | value to non-payable contract | computed from gas | failed |
//! | 5 | regular | record fee | successful |
//!
//! Zero-value transfers are never emitted.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::{debug, trace};

use crate::amount::{is_non_zero_amount, magnitude_of_amount, multiply_unsigned};
use crate::error::{ConfigError, ConfigResult, DecodeResult};
use crate::metrics::{record_decode_error, record_decomposed, record_operation_emitted};
use crate::models::{
    Operation, OperationDirection, OperationStatus, OperationSubtype, OperationType,
    TransferRecord, TransferStatus, TransferType,
};
use crate::ports::{AddressClassifier, CallDataValidator};

// =============================================================================
// Configuration
// =============================================================================

/// Arguments for [`OperationDecomposer::new`].
#[derive(Clone, Default)]
pub struct OperationDecomposerArgs {
    pub address_classifier: Option<Arc<dyn AddressClassifier>>,
    pub call_data_validator: Option<Arc<dyn CallDataValidator>>,
    /// Gas charged for any transaction, must be > 0.
    pub min_gas_limit: u64,
    /// Gas charged per payload byte.
    pub gas_limit_per_byte: u64,
}

// =============================================================================
// Categories
// =============================================================================

/// Classification of a record, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCategory {
    StakingReward,
    Invalid,
    SmartContractResult,
    NonPayableContract,
    Regular,
}

impl RecordCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StakingReward => "staking_reward",
            Self::Invalid => "invalid",
            Self::SmartContractResult => "smart_contract_result",
            Self::NonPayableContract => "non_payable_contract",
            Self::Regular => "regular",
        }
    }

    /// Whether records of this category pay a fee of their own.
    pub const fn charges_fee(&self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::NonPayableContract | Self::Regular
        )
    }
}

impl std::fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OperationDecomposer
// =============================================================================

/// Turns one [`TransferRecord`] into its list of [`Operation`]s.
///
/// The decomposer is stateless apart from its configuration and can be
/// shared between threads behind an `Arc`.
pub struct OperationDecomposer {
    address_classifier: Arc<dyn AddressClassifier>,
    call_data_validator: Arc<dyn CallDataValidator>,
    min_gas_limit: u64,
    gas_limit_per_byte: u64,
}

impl OperationDecomposer {
    pub fn new(args: OperationDecomposerArgs) -> ConfigResult<Self> {
        let address_classifier = args
            .address_classifier
            .ok_or(ConfigError::MissingAddressClassifier)?;
        let call_data_validator = args
            .call_data_validator
            .ok_or(ConfigError::MissingCallDataValidator)?;
        if args.min_gas_limit == 0 {
            return Err(ConfigError::BadMinGasLimit(args.min_gas_limit));
        }

        Ok(Self {
            address_classifier,
            call_data_validator,
            min_gas_limit: args.min_gas_limit,
            gas_limit_per_byte: args.gas_limit_per_byte,
        })
    }

    pub fn min_gas_limit(&self) -> u64 {
        self.min_gas_limit
    }

    pub fn gas_limit_per_byte(&self) -> u64 {
        self.gas_limit_per_byte
    }

    /// Decompose a record into balance-changing operations.
    ///
    /// Fails only when the receiver address cannot be decoded while testing
    /// for the non-payable contract case. No partial list is returned.
    pub fn decompose(&self, record: &TransferRecord) -> DecodeResult<Vec<Operation>> {
        let category = self.classify(record).inspect_err(|e| {
            record_decode_error();
            debug!(tx = %record.hash, error = %e, "Cannot classify record");
        })?;

        let operations = match category {
            RecordCategory::StakingReward => staking_reward_operations(record),
            RecordCategory::Invalid => invalid_operations(record),
            RecordCategory::SmartContractResult => smart_contract_result_operations(record),
            RecordCategory::NonPayableContract => {
                let fee = self.non_payable_contract_fee(record);
                non_payable_contract_operations(record, &fee)
            }
            RecordCategory::Regular => regular_operations(record),
        };

        record_decomposed(category);
        for operation in &operations {
            record_operation_emitted(operation.operation_type);
        }

        trace!(
            tx = %record.hash,
            category = %category,
            operations = operations.len(),
            "Decomposed record"
        );

        Ok(operations)
    }

    /// Find the category of a record.
    pub fn classify(&self, record: &TransferRecord) -> DecodeResult<RecordCategory> {
        if is_staking_reward(record) {
            return Ok(RecordCategory::StakingReward);
        }
        if record.is_invalid() {
            return Ok(RecordCategory::Invalid);
        }
        if record.is_smart_contract_result() {
            return Ok(RecordCategory::SmartContractResult);
        }
        if self.is_sending_value_to_non_payable_contract(record)? {
            return Ok(RecordCategory::NonPayableContract);
        }

        Ok(RecordCategory::Regular)
    }

    /// Value sent to a contract without a well-formed call.
    ///
    /// The indexer reports some of these as successful regular transactions,
    /// so only clean regular successes are skipped up front.
    fn is_sending_value_to_non_payable_contract(
        &self,
        record: &TransferRecord,
    ) -> DecodeResult<bool> {
        let is_status_fail = record.status == TransferStatus::Fail;
        let is_regular = record.transfer_type == TransferType::Regular;
        if !is_status_fail && is_regular {
            return Ok(false);
        }

        let receiver = self.address_classifier.decode(&record.receiver)?;
        if !self.address_classifier.is_smart_contract(&receiver) {
            return Ok(false);
        }

        Ok(!self.call_data_validator.is_valid_call(&record.data))
    }

    /// Fee charged when value bounces off a non-payable contract.
    pub fn non_payable_contract_fee(&self, record: &TransferRecord) -> BigUint {
        let payload_len = u64::try_from(record.data.len()).unwrap_or(u64::MAX);
        let gas_limit = self
            .min_gas_limit
            .saturating_add(self.gas_limit_per_byte.saturating_mul(payload_len));

        multiply_unsigned(gas_limit, record.gas_price)
    }
}

fn is_staking_reward(record: &TransferRecord) -> bool {
    record.is_from_metachain() && is_non_zero_amount(&record.value) && !record.has_payload()
}

// =============================================================================
// Emitters
// =============================================================================

fn staking_reward_operations(record: &TransferRecord) -> Vec<Operation> {
    vec![Operation::native(
        OperationType::Reward,
        OperationSubtype::StakingRewards,
        OperationStatus::Success,
        &record.receiver,
        magnitude_of_amount(&record.value),
        OperationDirection::Credit,
    )]
}

fn invalid_operations(record: &TransferRecord) -> Vec<Operation> {
    let mut operations = vec![fee_operation(
        OperationSubtype::FeeOfInvalidTransaction,
        record,
        magnitude_of_amount(&record.fee),
    )];
    push_transfer_pair(&mut operations, record, OperationStatus::Failure);
    operations
}

fn smart_contract_result_operations(record: &TransferRecord) -> Vec<Operation> {
    let mut operations = Vec::new();
    push_transfer_pair(&mut operations, record, OperationStatus::Success);
    operations
}

fn non_payable_contract_operations(record: &TransferRecord, fee: &BigUint) -> Vec<Operation> {
    let mut operations = vec![fee_operation(
        OperationSubtype::FeeOfInvalidTransaction,
        record,
        fee.to_string(),
    )];
    push_transfer_pair(&mut operations, record, OperationStatus::Failure);
    operations
}

fn regular_operations(record: &TransferRecord) -> Vec<Operation> {
    let mut operations = vec![fee_operation(
        OperationSubtype::FeeRegular,
        record,
        magnitude_of_amount(&record.fee),
    )];
    push_transfer_pair(&mut operations, record, OperationStatus::Success);
    operations
}

/// Fee paid by the sender. Fees always succeed.
fn fee_operation(subtype: OperationSubtype, record: &TransferRecord, amount: String) -> Operation {
    Operation::native(
        OperationType::Fee,
        subtype,
        OperationStatus::Success,
        &record.sender,
        amount,
        OperationDirection::Debit,
    )
}

/// Debit sender and credit receiver with the record value, unless it is zero.
fn push_transfer_pair(
    operations: &mut Vec<Operation>,
    record: &TransferRecord,
    status: OperationStatus,
) {
    if !is_non_zero_amount(&record.value) {
        return;
    }

    let amount = magnitude_of_amount(&record.value);
    operations.push(Operation::native(
        OperationType::Transfer,
        OperationSubtype::TransferNative,
        status,
        &record.sender,
        amount.clone(),
        OperationDirection::Debit,
    ));
    operations.push(Operation::native(
        OperationType::Transfer,
        OperationSubtype::TransferNative,
        status,
        &record.receiver,
        amount,
        OperationDirection::Credit,
    ));
}

// =============================================================================
// Tests
// =============================================================================
