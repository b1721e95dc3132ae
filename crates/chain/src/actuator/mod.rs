//! # Actuators
//!
//! One actuator per operation kind. Each implements a two-phase contract:
//!
//! | Phase | Signature | Guarantee |
//! |-------|-----------|-----------|
//! | `validate` | `&LedgerStore` | read-only; an `Err` means the store was not touched |
//! | `execute` | `&mut LedgerStore` | only called after a passing `validate` on the same state |
//!
//! Validation checks run in a fixed order and the FIRST failing check
//! decides the error, so identical input always yields the identical error.
//!
//! ## Kinds
//!
//! | Kind | Actuator | Fee on receipt |
//! |------|----------|----------------|
//! | `Transfer` | [`TransferActuator`] | 0 |
//! | `TransferAsset` | [`TransferAssetActuator`] | 0 |
//! | `AssetIssue` | [`AssetIssueActuator`] | `asset_issue_fee` |
//! | `WitnessCreate` | [`WitnessCreateActuator`] | `account_upgrade_cost` |
//!
//! Fees are never destroyed: the debited amount is credited to the
//! black-hole account.

pub mod asset_issue;
pub mod transfer;
pub mod transfer_asset;
pub mod witness_create;

pub use asset_issue::AssetIssueActuator;
pub use transfer::TransferActuator;
pub use transfer_asset::TransferAssetActuator;
pub use witness_create::WitnessCreateActuator;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, ValidationError};
use crate::state::LedgerStore;
use crate::tx::{Operation, OperationKind};
use crate::types::{readable_address, Address};

/// Validate/execute contract shared by every operation kind.
pub trait Actuator {
    fn validate(&self, state: &LedgerStore) -> Result<(), ValidationError>;

    fn execute(&self, state: &mut LedgerStore) -> Result<ExecutionReceipt, ExecutionError>;

    /// Address of the account that authorized the operation, taken from the
    /// decoded payload.
    fn owner_address(&self) -> Result<Address, ValidationError>;

    /// Nominal protocol fee, independent of state.
    fn calc_fee(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    Success,
    Failed,
}

/// Per-operation result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub status: ResultCode,
    pub fee: u64,
}

impl ExecutionReceipt {
    pub fn success(fee: u64) -> Self {
        Self {
            status: ResultCode::Success,
            fee,
        }
    }

    pub fn failed(fee: u64) -> Self {
        Self {
            status: ResultCode::Failed,
            fee,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultCode::Success
    }
}

/// Pick the actuator for the envelope's declared kind.
pub fn create_actuator(op: &Operation) -> Box<dyn Actuator + '_> {
    match op.kind {
        OperationKind::Transfer => Box::new(TransferActuator::new(op)),
        OperationKind::TransferAsset => Box::new(TransferAssetActuator::new(op)),
        OperationKind::AssetIssue => Box::new(AssetIssueActuator::new(op)),
        OperationKind::WitnessCreate => Box::new(WitnessCreateActuator::new(op)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SHARED CHECKS
// ════════════════════════════════════════════════════════════════════════════

/// Parse a payload address, failing with `InvalidAddress(message)`.
pub(crate) fn parse_address(bytes: &[u8], message: &str) -> Result<Address, ValidationError> {
    Address::from_slice(bytes).ok_or_else(|| ValidationError::InvalidAddress(message.to_string()))
}

/// The payload owner must be the envelope signer.
pub(crate) fn ensure_envelope_owner(op: &Operation, owner: &Address) -> Result<(), ValidationError> {
    if op.owner() != Some(*owner) {
        return Err(ValidationError::InvalidAddress(format!(
            "owner {} does not match envelope signer {}",
            owner,
            readable_address(&op.owner_address)
        )));
    }
    Ok(())
}

/// Payload address in execute, after validate already accepted it.
pub(crate) fn execution_address(bytes: &[u8]) -> Result<Address, ExecutionError> {
    Address::from_slice(bytes)
        .ok_or_else(|| ExecutionError::MalformedPayload(format!("bad address {}", readable_address(bytes))))
}

/// Non-negative fee as carried on a receipt.
pub(crate) fn receipt_fee(amount: i64) -> u64 {
    u64::try_from(amount).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{OperationPayload, TransferContract, WitnessCreateContract};

    fn addr(b: u8) -> Address {
        Address::from_account_bytes([b; 20])
    }

    #[test]
    fn factory_dispatches_on_declared_kind() {
        let transfer = Operation::new(&OperationPayload::Transfer(TransferContract {
            owner_address: addr(1).to_vec(),
            to_address: addr(2).to_vec(),
            amount: 1,
        }));
        let witness = Operation::new(&OperationPayload::WitnessCreate(WitnessCreateContract {
            owner_address: addr(3).to_vec(),
            url: b"https://w.example".to_vec(),
        }));

        assert_eq!(create_actuator(&transfer).owner_address(), Ok(addr(1)));
        assert_eq!(create_actuator(&witness).owner_address(), Ok(addr(3)));
        assert_eq!(create_actuator(&witness).calc_fee(), 0);
    }

    #[test]
    fn envelope_owner_must_match() {
        let mut op = Operation::new(&OperationPayload::Transfer(TransferContract {
            owner_address: addr(1).to_vec(),
            to_address: addr(2).to_vec(),
            amount: 1,
        }));
        assert!(ensure_envelope_owner(&op, &addr(1)).is_ok());

        op.owner_address = addr(7).to_vec();
        assert!(matches!(
            ensure_envelope_owner(&op, &addr(1)),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn receipt_constructors() {
        assert!(ExecutionReceipt::success(5).is_success());
        assert_eq!(ExecutionReceipt::failed(0).status, ResultCode::Failed);
        assert_eq!(receipt_fee(-1), 0);
    }
}
