//! Balance reconciliation for a single account.
//!
//! Replays decomposed operations against a starting balance and compares
//! the computed balance with the balance history reported by the chain.
//! Only successful operations touching the tracked address move the
//! balance.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::amount::parse_amount;
use crate::models::{Operation, OperationDirection, OperationStatus, OperationType, TransferRecord};

/// One applied operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub operation_type: OperationType,
    pub direction: OperationDirection,
    pub amount: BigInt,
}

/// Effect of one record on the tracked balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta {
    pub hash: String,
    pub round: u64,
    pub timestamp: u64,
    pub entries: Vec<LedgerEntry>,
    /// Balance after this record.
    pub balance: BigInt,
}

impl BalanceDelta {
    pub fn credited(&self) -> BigInt {
        self.sum(OperationDirection::Credit)
    }

    pub fn debited(&self) -> BigInt {
        self.sum(OperationDirection::Debit)
    }

    /// Net change (credits minus debits).
    pub fn net(&self) -> BigInt {
        self.credited() - self.debited()
    }

    fn sum(&self, direction: OperationDirection) -> BigInt {
        self.entries
            .iter()
            .filter(|entry| entry.direction == direction)
            .map(|entry| &entry.amount)
            .sum()
    }
}

/// Running balance of one address.
#[derive(Debug, Clone)]
pub struct BalanceTracker {
    address: String,
    balance: BigInt,
}

impl BalanceTracker {
    pub fn new(address: impl Into<String>, starting_balance: BigInt) -> Self {
        Self {
            address: address.into(),
            balance: starting_balance,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn balance(&self) -> &BigInt {
        &self.balance
    }

    /// Actual minus computed balance.
    pub fn delta_against(&self, actual: &BigInt) -> BigInt {
        actual - &self.balance
    }

    /// Apply the operations produced for `record`.
    pub fn apply(&mut self, record: &TransferRecord, operations: &[Operation]) -> BalanceDelta {
        let mut entries = Vec::new();

        for operation in operations {
            if operation.address != self.address || operation.status != OperationStatus::Success {
                continue;
            }

            let amount = parse_amount(&operation.amount_value).unwrap_or_else(|| {
                warn!(
                    tx = %record.hash,
                    amount = %operation.amount_value,
                    "Unparsable operation amount, counted as zero"
                );
                BigInt::zero()
            });

            match operation.direction {
                OperationDirection::Credit => self.balance += &amount,
                OperationDirection::Debit => self.balance -= &amount,
            }

            entries.push(LedgerEntry {
                operation_type: operation.operation_type,
                direction: operation.direction,
                amount,
            });
        }

        BalanceDelta {
            hash: record.hash.clone(),
            round: record.round,
            timestamp: record.timestamp,
            entries,
            balance: self.balance.clone(),
        }
    }
}

/// Timestamp at which a round starts.
pub fn round_to_timestamp(genesis_time: u64, round_duration: u64, round: u64) -> u64 {
    genesis_time.saturating_add(round.saturating_mul(round_duration))
}

// =============================================================================
// Balance history
// =============================================================================

/// Balance of an account after a change, as reported by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub timestamp: u64,
    /// Decimal balance.
    #[serde(default)]
    pub balance: String,
}

impl BalanceRecord {
    /// Numeric balance. Unparsable balances count as zero.
    pub fn amount(&self) -> BigInt {
        parse_amount(&self.balance).unwrap_or_else(|| {
            warn!(
                timestamp = self.timestamp,
                balance = %self.balance,
                "Unparsable balance record, counted as zero"
            );
            BigInt::zero()
        })
    }
}

/// Chain-reported balance history of one account, ascending by timestamp.
#[derive(Debug, Clone, Default)]
pub struct BalanceHistory {
    records: Vec<BalanceRecord>,
}

impl BalanceHistory {
    /// Build a history from records in any order.
    pub fn new(mut records: Vec<BalanceRecord>) -> Self {
        records.sort_by_key(|record| record.timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First balance change at or after `timestamp`.
    pub fn find_balance_at(&self, timestamp: u64) -> Option<&BalanceRecord> {
        let index = self
            .records
            .partition_point(|record| record.timestamp < timestamp);
        let found = self.records.get(index);
        trace!(timestamp, found = found.is_some(), "Balance history lookup");
        found
    }

    /// First balance change at or after the start of `round`.
    pub fn find_balance_at_round(
        &self,
        genesis_time: u64,
        round_duration: u64,
        round: u64,
    ) -> Option<&BalanceRecord> {
        self.find_balance_at(round_to_timestamp(genesis_time, round_duration, round))
    }
}
