//! Issued-asset transfer. The only operation kind that may be paid for by
//! the asset issuer's bandwidth.
//!
//! Validation order: payload shape, owner address (must be the envelope
//! signer), recipient address, asset name non-empty, amount > 0,
//! owner != recipient, owner exists, asset exists, owner holds >= amount,
//! recipient holding + amount fits `i64`.

use tracing::debug;

use super::{
    ensure_envelope_owner, execution_address, parse_address, Actuator, ExecutionReceipt,
};
use crate::error::{ExecutionError, PayloadError, ValidationError};
use crate::state::{internal_account, KvStore, LedgerStore};
use crate::tx::{Operation, OperationKind, OperationPayload, TransferAssetContract};
use crate::types::{readable_address, Address};

pub struct TransferAssetActuator<'a> {
    operation: &'a Operation,
}

impl<'a> TransferAssetActuator<'a> {
    pub fn new(operation: &'a Operation) -> Self {
        Self { operation }
    }

    fn contract(&self) -> Result<TransferAssetContract, PayloadError> {
        match self.operation.decode_payload()? {
            OperationPayload::TransferAsset(contract) => Ok(contract),
            other => Err(PayloadError::TypeMismatch {
                expected: OperationKind::TransferAsset,
                actual: other.kind(),
            }),
        }
    }
}

impl Actuator for TransferAssetActuator<'_> {
    fn validate(&self, state: &LedgerStore) -> Result<(), ValidationError> {
        let contract = self.contract()?;
        let owner = parse_address(&contract.owner_address, "Invalid ownerAddress")?;
        ensure_envelope_owner(self.operation, &owner)?;
        let to = parse_address(&contract.to_address, "Invalid toAddress")?;

        if contract.asset_name.is_empty() {
            return Err(ValidationError::InvalidAssetName("No asset !".into()));
        }
        if contract.amount <= 0 {
            return Err(ValidationError::InvalidAmount("Amount must greater than 0.".into()));
        }
        if owner == to {
            return Err(ValidationError::InvalidParameter(
                "Cannot transfer asset to yourself.".into(),
            ));
        }

        let account = state.accounts.get(&owner).ok_or_else(|| {
            ValidationError::AccountNotFound(format!(
                "account[{}] not exists",
                readable_address(&contract.owner_address)
            ))
        })?;
        if !state.assets.has(&contract.asset_name) {
            return Err(ValidationError::AssetNotFound(format!(
                "No asset named {}",
                contract.asset_name
            )));
        }

        let held = account.asset_balance(&contract.asset_name);
        if held < contract.amount {
            return Err(ValidationError::InsufficientBalance(
                "assetBalance is not sufficient.".into(),
            ));
        }

        let to_held = state
            .accounts
            .get(&to)
            .map(|a| a.asset_balance(&contract.asset_name))
            .unwrap_or(0);
        if to_held.checked_add(contract.amount).is_none() {
            return Err(ValidationError::InvalidAmount(format!(
                "recipient holding {to_held} cannot absorb {}",
                contract.amount
            )));
        }
        Ok(())
    }

    fn execute(&self, state: &mut LedgerStore) -> Result<ExecutionReceipt, ExecutionError> {
        let contract = self.contract()?;
        let owner = execution_address(&contract.owner_address)?;
        let to = execution_address(&contract.to_address)?;

        internal_account::transfer_asset_raw(
            state,
            &owner,
            &to,
            &contract.asset_name,
            contract.amount,
        )?;

        debug!(
            asset = %contract.asset_name,
            from = %owner,
            to = %to,
            amount = contract.amount,
            "asset transfer applied"
        );
        Ok(ExecutionReceipt::success(self.calc_fee()))
    }

    fn owner_address(&self) -> Result<Address, ValidationError> {
        let contract = self.contract()?;
        parse_address(&contract.owner_address, "Invalid ownerAddress")
    }

    fn calc_fee(&self) -> u64 {
        0
    }
}
