//! Witness registration.
//!
//! Validation order (first failure wins):
//! 1. payload decodes as `WitnessCreate`
//! 2. owner address well-formed and equal to the envelope signer
//! 3. url passes `valid_url`
//! 4. owner account exists
//! 5. no witness record for the owner yet
//! 6. owner balance >= `account_upgrade_cost`
//!
//! Execute creates the witness (0 votes), sets the account's witness flag,
//! and moves the upgrade cost from the owner to the black hole.

use tracing::debug;

use super::{
    ensure_envelope_owner, execution_address, parse_address, receipt_fee, Actuator,
    ExecutionReceipt,
};
use crate::error::{ExecutionError, PayloadError, ValidationError};
use crate::state::{internal_account, KvStore, LedgerStore, Witness};
use crate::tx::{Operation, OperationKind, OperationPayload, WitnessCreateContract};
use crate::types::{readable_address, Address, BLACK_HOLE_ADDRESS};
use crate::util::valid_url;

pub struct WitnessCreateActuator<'a> {
    operation: &'a Operation,
}

impl<'a> WitnessCreateActuator<'a> {
    pub fn new(operation: &'a Operation) -> Self {
        Self { operation }
    }

    fn contract(&self) -> Result<WitnessCreateContract, PayloadError> {
        match self.operation.decode_payload()? {
            OperationPayload::WitnessCreate(contract) => Ok(contract),
            other => Err(PayloadError::TypeMismatch {
                expected: OperationKind::WitnessCreate,
                actual: other.kind(),
            }),
        }
    }
}

impl Actuator for WitnessCreateActuator<'_> {
    fn validate(&self, state: &LedgerStore) -> Result<(), ValidationError> {
        let contract = self.contract()?;
        let owner = parse_address(&contract.owner_address, "Invalidate address")?;
        ensure_envelope_owner(self.operation, &owner)?;

        if !valid_url(&contract.url) {
            return Err(ValidationError::InvalidUrl("Invalidate url".into()));
        }

        let readable = readable_address(&contract.owner_address);
        let account = state
            .accounts
            .get(&owner)
            .ok_or_else(|| ValidationError::AccountNotFound(format!("account[{readable}] not exists")))?;

        if state.witnesses.has(&owner) {
            return Err(ValidationError::AlreadyExists(format!(
                "Witness[{readable}] has existed"
            )));
        }

        if account.balance < state.account_upgrade_cost() {
            return Err(ValidationError::InsufficientBalance(
                "balance < AccountUpgradeCost".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, state: &mut LedgerStore) -> Result<ExecutionReceipt, ExecutionError> {
        let contract = self.contract()?;
        let owner = execution_address(&contract.owner_address)?;
        let url = String::from_utf8(contract.url)
            .map_err(|e| ExecutionError::MalformedPayload(e.to_string()))?;
        let cost = state.account_upgrade_cost();

        // Every check before the first write: nothing is applied on error.
        let mut account = state
            .accounts
            .get(&owner)
            .ok_or_else(|| ExecutionError::AccountNotFound(owner.to_string()))?;
        if account.balance < cost {
            return Err(ExecutionError::InsufficientBalance(format!(
                "account {owner} balance {} < upgrade cost {cost}",
                account.balance
            )));
        }

        state.witnesses.put(owner, Witness::new(owner, url));
        account.is_witness = true;
        account.balance -= cost;
        state.accounts.put(owner, account);
        internal_account::credit_or_create(state, &BLACK_HOLE_ADDRESS, cost);

        debug!(witness = %owner, cost, "witness created");
        Ok(ExecutionReceipt::success(receipt_fee(cost)))
    }

    fn owner_address(&self) -> Result<Address, ValidationError> {
        let contract = self.contract()?;
        parse_address(&contract.owner_address, "Invalidate address")
    }

    fn calc_fee(&self) -> u64 {
        0
    }
}
