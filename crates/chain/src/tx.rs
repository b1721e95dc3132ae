//! operation envelope, typed payloads and transaction id helpers
//!
//! The payload bytes inside an `Operation` are a bincode-encoded
//! `OperationPayload`. Because the enum tag is part of the encoding, the
//! bytes are self-describing: decoding can tell "not an operation at all"
//! (`PayloadError::Malformed`) apart from "a different operation than the
//! envelope declares" (`PayloadError::TypeMismatch`).

use bincode::Options;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::error::PayloadError;
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Transfer,
    TransferAsset,
    AssetIssue,
    WitnessCreate,
}

/// Move native balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferContract {
    pub owner_address: Vec<u8>,
    pub to_address: Vec<u8>,
    pub amount: i64,
}

/// Move issued-asset units. The only kind eligible for asset-sponsored
/// bandwidth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAssetContract {
    pub asset_name: String,
    pub owner_address: Vec<u8>,
    pub to_address: Vec<u8>,
    pub amount: i64,
}

/// Issue a new asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIssueContract {
    pub owner_address: Vec<u8>,
    pub name: String,
    pub total_supply: i64,
    pub trx_num: i32,
    pub num: i32,
    pub start_time: i64,
    pub end_time: i64,
    pub description: String,
    pub url: Vec<u8>,
    pub free_asset_net_limit: i64,
}

/// Register the owner as a witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCreateContract {
    pub owner_address: Vec<u8>,
    pub url: Vec<u8>,
}

/// Payload variants, one per `OperationKind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPayload {
    Transfer(TransferContract),
    TransferAsset(TransferAssetContract),
    AssetIssue(AssetIssueContract),
    WitnessCreate(WitnessCreateContract),
}

impl OperationPayload {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationPayload::Transfer(_) => OperationKind::Transfer,
            OperationPayload::TransferAsset(_) => OperationKind::TransferAsset,
            OperationPayload::AssetIssue(_) => OperationKind::AssetIssue,
            OperationPayload::WitnessCreate(_) => OperationKind::WitnessCreate,
        }
    }

    pub fn owner_address(&self) -> &[u8] {
        match self {
            OperationPayload::Transfer(c) => &c.owner_address,
            OperationPayload::TransferAsset(c) => &c.owner_address,
            OperationPayload::AssetIssue(c) => &c.owner_address,
            OperationPayload::WitnessCreate(c) => &c.owner_address,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        // Vec/String/integer fields only: serialization cannot fail.
        payload_codec().serialize(self).unwrap_or_default()
    }

    /// Exactly one record, nothing after it. A payload has a single valid
    /// byte encoding, so equal operations always hash to the same id.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        payload_codec()
            .deserialize(bytes)
            .map_err(|e| PayloadError::Malformed(e.to_string()))
    }
}

/// Fixed-width little-endian integers (the `bincode::serialize` layout),
/// trailing bytes rejected.
fn payload_codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Envelope as received from the network: declared kind, signer address,
/// and the opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub owner_address: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Operation {
    /// Wrap a typed payload, deriving kind and owner from it.
    pub fn new(payload: &OperationPayload) -> Self {
        Self {
            kind: payload.kind(),
            owner_address: payload.owner_address().to_vec(),
            payload: payload.encode(),
        }
    }

    /// Decode the payload and check it matches the declared kind.
    pub fn decode_payload(&self) -> Result<OperationPayload, PayloadError> {
        let payload = OperationPayload::decode(&self.payload)?;
        if payload.kind() != self.kind {
            return Err(PayloadError::TypeMismatch {
                expected: self.kind,
                actual: payload.kind(),
            });
        }
        Ok(payload)
    }

    /// Paying account, if the envelope address is well-formed.
    pub fn owner(&self) -> Option<Address> {
        Address::from_slice(&self.owner_address)
    }

    /// Bytes charged against bandwidth: the size of the encoded envelope.
    pub fn encoded_size(&self) -> u64 {
        bincode::serialized_size(self).unwrap_or(0)
    }
}

/// Ordered list of operations applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub operations: Vec<Operation>,
    /// Creation time in ms, part of the id.
    pub timestamp: u64,
}

impl Transaction {
    pub fn new(operations: Vec<Operation>, timestamp: u64) -> Self {
        Self {
            operations,
            timestamp,
        }
    }

    pub fn single(payload: &OperationPayload, timestamp: u64) -> Self {
        Self::new(vec![Operation::new(payload)], timestamp)
    }

    /// SHA3-256 over the encoded transaction.
    pub fn id(&self) -> [u8; 32] {
        let bytes = bincode::serialize(self).unwrap_or_default();
        Sha3_256::digest(&bytes).into()
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::from_account_bytes([0x5a; 20])
    }

    fn witness_payload() -> OperationPayload {
        OperationPayload::WitnessCreate(WitnessCreateContract {
            owner_address: owner().to_vec(),
            url: b"https://witness.example".to_vec(),
        })
    }

    #[test]
    fn envelope_carries_kind_and_owner() {
        let op = Operation::new(&witness_payload());
        assert_eq!(op.kind, OperationKind::WitnessCreate);
        assert_eq!(op.owner(), Some(owner()));
        assert_eq!(op.decode_payload().unwrap(), witness_payload());
    }

    #[test]
    fn wrong_shape_is_distinct_from_garbage() {
        let mut op = Operation::new(&witness_payload());
        op.kind = OperationKind::Transfer;
        assert_eq!(
            op.decode_payload(),
            Err(PayloadError::TypeMismatch {
                expected: OperationKind::Transfer,
                actual: OperationKind::WitnessCreate,
            })
        );

        op.payload = vec![0xff, 0xff, 0xff, 0xff];
        assert!(matches!(op.decode_payload(), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn padded_payload_is_malformed() {
        let mut op = Operation::new(&witness_payload());
        assert_eq!(op.payload, bincode::serialize(&witness_payload()).unwrap());

        op.payload.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(op.decode_payload(), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn encoded_size_grows_with_payload() {
        let small = Operation::new(&witness_payload());
        let big = Operation::new(&OperationPayload::WitnessCreate(WitnessCreateContract {
            owner_address: owner().to_vec(),
            url: vec![b'a'; 200],
        }));
        assert!(small.encoded_size() > 0);
        assert!(big.encoded_size() > small.encoded_size());
    }

    #[test]
    fn transaction_id_is_deterministic() {
        let a = Transaction::single(&witness_payload(), 1_000);
        let b = Transaction::single(&witness_payload(), 1_000);
        let c = Transaction::single(&witness_payload(), 1_001);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id_hex().len(), 64);
    }
}
