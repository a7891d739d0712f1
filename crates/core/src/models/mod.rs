//! Domain models for transfer classification.
//!
//! [`TransferRecord`] is the indexed input (transaction, transfer or
//! bundle, unified into one shape). [`Operation`] is the output: one
//! balance effect on one account.

use serde::{Deserialize, Serialize};

/// Shard identifier of the metachain.
pub const METACHAIN_SHARD_ID: u32 = u32::MAX;

// =============================================================================
// Tag Enums
// =============================================================================

/// Macro to generate string-tagged enums used on the wire.
///
/// Generates:
/// - serde (de)serialization using the given tags
/// - `as_str()` returning the tag
/// - `Display` trait implementation
macro_rules! wire_tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            /// Wire tag of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_tag_enum!(
    /// Outcome of an operation.
    OperationStatus {
        Success => "success",
        Failure => "failure",
        Pending => "pending",
    }
);

wire_tag_enum!(
    /// Kind of balance effect.
    OperationType {
        Transfer => "transfer",
        Fee => "fee",
        FeeRefund => "feeRefund",
        Reward => "reward",
        TokenManagement => "tokenManagement",
    }
);

wire_tag_enum!(
    /// Refinement of [`OperationType`].
    OperationSubtype {
        // Transfers
        TransferNative => "transferNative",
        TransferCustomFungible => "transferCustomFungible",
        TransferCustomSemiFungible => "transferCustomSemiFungible",
        TransferCustomNonFungible => "transferCustomNonFungible",
        // Fees
        FeeRegular => "feeRegular",
        FeeOfInvalidTransaction => "feeOfInvalidTransaction",
        // Fee refunds
        FeeRefundAsReceipt => "feeRefundAsReceipt",
        FeeRefundAsSmartContractResult => "feeRefundAsSmartContractResult",
        // Rewards
        StakingRewards => "stakingRewards",
        DelegationRewards => "delegationRewards",
        DeveloperRewards => "developerRewards",
        // Token management
        CustomTokenMint => "customTokenMint",
        CustomTokenBurn => "customTokenBurn",
        CustomTokenWipe => "customTokenWipe",
    }
);

wire_tag_enum!(
    /// Asset class of an operation amount.
    AmountType {
        Native => "native",
        CustomFungible => "customFungible",
        CustomSemiFungible => "customSemiFungible",
        CustomNonFungible => "customNonFungible",
    }
);

wire_tag_enum!(
    /// Whether the operation adds to or removes from the account balance.
    OperationDirection {
        Credit => "credit",
        Debit => "debit",
    }
);

impl OperationDirection {
    /// The other side of a transfer.
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Credit => Self::Debit,
            Self::Debit => Self::Credit,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// A single balance-changing effect on one account.
///
/// `amount_value` is always a non-negative decimal magnitude; the sign is
/// carried by `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub status: OperationStatus,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub subtype: OperationSubtype,
    /// Affected account (human-readable form).
    pub address: String,
    pub amount_value: String,
    pub amount_type: AmountType,
    /// Token identifier for custom assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_currency: Option<String>,
    pub direction: OperationDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Operation {
    /// Build a native-currency operation.
    pub fn native(
        operation_type: OperationType,
        subtype: OperationSubtype,
        status: OperationStatus,
        address: impl Into<String>,
        amount_value: impl Into<String>,
        direction: OperationDirection,
    ) -> Self {
        Self {
            status,
            operation_type,
            subtype,
            address: address.into(),
            amount_value: amount_value.into(),
            amount_type: AmountType::Native,
            amount_currency: None,
            direction,
            metadata: None,
        }
    }

    pub fn is_fee(&self) -> bool {
        self.operation_type == OperationType::Fee
    }

    pub fn is_transfer(&self) -> bool {
        self.operation_type == OperationType::Transfer
    }
}

// =============================================================================
// Transfer Records
// =============================================================================

/// Type tag of an indexed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferType {
    /// User-submitted transaction.
    #[default]
    #[serde(alias = "normal", alias = "Transaction")]
    Regular,
    /// Synthetic entry produced by contract execution.
    #[serde(alias = "unsigned", alias = "SmartContractResult")]
    SmartContractResult,
    /// Protocol reward entry.
    #[serde(alias = "Reward")]
    Reward,
    /// Any tag this crate does not know about.
    #[serde(other)]
    Other,
}

/// Execution status of an indexed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferStatus {
    Success,
    #[serde(alias = "failed")]
    Fail,
    Invalid,
    Pending,
    /// Unknown or missing status.
    #[default]
    #[serde(other)]
    Other,
}

/// Receipt attached to a record. Carried through, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(rename = "txHash", default)]
    pub transaction_hash: String,
}

/// One indexed transaction or transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[serde(rename = "txHash", default)]
    pub hash: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub round: u64,
    #[serde(rename = "type", default)]
    pub transfer_type: TransferType,
    pub sender: String,
    #[serde(default)]
    pub sender_shard: u32,
    pub receiver: String,
    /// Decimal amount, empty means zero.
    #[serde(default)]
    pub value: String,
    /// Raw payload, base64 on the wire.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub gas_price: u64,
    /// Decimal fee, empty means not reported.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fee: String,
    #[serde(default)]
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransactionReceipt>,
}

impl TransferRecord {
    pub fn is_smart_contract_result(&self) -> bool {
        self.transfer_type == TransferType::SmartContractResult
    }

    pub fn is_invalid(&self) -> bool {
        self.status == TransferStatus::Invalid
    }

    pub fn is_from_metachain(&self) -> bool {
        self.sender_shard == METACHAIN_SHARD_ID
    }

    pub fn has_payload(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Base64 encoding for byte payloads, as produced by the indexer.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => STANDARD
                .decode(text.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transfer_record_from_indexer_json() {
        let record: TransferRecord = serde_json::from_value(json!({
            "txHash": "a1b2",
            "timestamp": 1648551606,
            "round": 1,
            "type": "normal",
            "sender": "erd1alice",
            "senderShard": 1,
            "receiver": "erd1bob",
            "value": "1000",
            "data": "aGVsbG8=",
            "gasPrice": 1000000000,
            "fee": "50000000000000",
            "status": "success"
        }))
        .unwrap();

        assert_eq!(record.hash, "a1b2");
        assert_eq!(record.transfer_type, TransferType::Regular);
        assert_eq!(record.data, b"hello");
        assert_eq!(record.gas_price, 1_000_000_000);
        assert_eq!(record.status, TransferStatus::Success);
        assert!(record.receipt.is_none());
    }

    // Les bundles n'ont ni type ni data: les valeurs par défaut doivent suffire
    #[test]
    fn transfer_record_minimal_fields() {
        let record: TransferRecord = serde_json::from_value(json!({
            "sender": "erd1alice",
            "receiver": "erd1bob",
            "status": "failed",
            "data": null
        }))
        .unwrap();

        assert_eq!(record.transfer_type, TransferType::Regular);
        assert_eq!(record.status, TransferStatus::Fail);
        assert!(record.value.is_empty());
        assert!(!record.has_payload());
    }

    #[test]
    fn transfer_record_without_status() {
        let record: TransferRecord = serde_json::from_value(json!({
            "sender": "erd1alice",
            "receiver": "erd1bob"
        }))
        .unwrap();

        assert_eq!(record.status, TransferStatus::Other);
        assert_eq!(
            serde_json::from_value::<TransferStatus>(json!("")).unwrap(),
            TransferStatus::Other
        );
    }

    #[test]
    fn transfer_type_aliases() {
        let parse = |tag: &str| serde_json::from_value::<TransferType>(json!(tag)).unwrap();
        assert_eq!(parse("smartContractResult"), TransferType::SmartContractResult);
        assert_eq!(parse("unsigned"), TransferType::SmartContractResult);
        assert_eq!(parse("reward"), TransferType::Reward);
        assert_eq!(parse("somethingNew"), TransferType::Other);
    }

    #[test]
    fn transfer_record_rejects_bad_base64() {
        let result = serde_json::from_value::<TransferRecord>(json!({
            "sender": "a",
            "receiver": "b",
            "status": "success",
            "data": "not base64!"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn operation_wire_shape() {
        let op = Operation::native(
            OperationType::Fee,
            OperationSubtype::FeeOfInvalidTransaction,
            OperationStatus::Success,
            "erd1alice",
            "50",
            OperationDirection::Debit,
        );
        let value = serde_json::to_value(&op).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "success",
                "type": "fee",
                "subtype": "feeOfInvalidTransaction",
                "address": "erd1alice",
                "amountValue": "50",
                "amountType": "native",
                "direction": "debit"
            })
        );
    }

    #[test]
    fn operation_metadata_roundtrips_when_present() {
        let value = json!({
            "status": "success",
            "type": "reward",
            "subtype": "stakingRewards",
            "address": "erd1bob",
            "amountValue": "1",
            "amountType": "native",
            "direction": "credit",
            "metadata": {"txHash": "ff"}
        });

        let op: Operation = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(op.metadata.as_ref().unwrap()["txHash"], json!("ff"));
        assert_eq!(serde_json::to_value(&op).unwrap(), value);
    }

    #[test]
    fn tag_display() {
        assert_eq!(OperationSubtype::FeeRefundAsSmartContractResult.to_string(), "feeRefundAsSmartContractResult");
        assert_eq!(AmountType::CustomNonFungible.as_str(), "customNonFungible");
        assert_eq!(OperationDirection::Credit.opposite(), OperationDirection::Debit);
    }
}
