//! Native balance transfer.
//!
//! Validation order: payload shape, owner address (must be the envelope
//! signer), recipient address, owner != recipient, amount > 0, owner
//! exists, owner balance >= amount, recipient balance + amount fits `i64`.
//! The recipient account is created on first credit.

use tracing::debug;

use super::{
    ensure_envelope_owner, execution_address, parse_address, Actuator, ExecutionReceipt,
};
use crate::error::{ExecutionError, PayloadError, ValidationError};
use crate::state::{internal_account, KvStore, LedgerStore};
use crate::tx::{Operation, OperationKind, OperationPayload, TransferContract};
use crate::types::{readable_address, Address};

pub struct TransferActuator<'a> {
    operation: &'a Operation,
}

impl<'a> TransferActuator<'a> {
    pub fn new(operation: &'a Operation) -> Self {
        Self { operation }
    }

    fn contract(&self) -> Result<TransferContract, PayloadError> {
        match self.operation.decode_payload()? {
            OperationPayload::Transfer(contract) => Ok(contract),
            other => Err(PayloadError::TypeMismatch {
                expected: OperationKind::Transfer,
                actual: other.kind(),
            }),
        }
    }
}

impl Actuator for TransferActuator<'_> {
    fn validate(&self, state: &LedgerStore) -> Result<(), ValidationError> {
        let contract = self.contract()?;
        let owner = parse_address(&contract.owner_address, "Invalid ownerAddress")?;
        ensure_envelope_owner(self.operation, &owner)?;
        let to = parse_address(&contract.to_address, "Invalid toAddress")?;

        if owner == to {
            return Err(ValidationError::InvalidParameter(
                "Cannot transfer trx to yourself.".into(),
            ));
        }
        if contract.amount <= 0 {
            return Err(ValidationError::InvalidAmount("Amount must greater than 0.".into()));
        }

        let account = state.accounts.get(&owner).ok_or_else(|| {
            ValidationError::AccountNotFound(format!(
                "account[{}] not exists",
                readable_address(&contract.owner_address)
            ))
        })?;
        if account.balance < contract.amount {
            return Err(ValidationError::InsufficientBalance(format!(
                "balance is not sufficient: {} < {}",
                account.balance, contract.amount
            )));
        }

        let to_balance = internal_account::get_balance(state, &to);
        if to_balance.checked_add(contract.amount).is_none() {
            return Err(ValidationError::InvalidAmount(format!(
                "recipient balance {to_balance} cannot absorb {}",
                contract.amount
            )));
        }
        Ok(())
    }

    fn execute(&self, state: &mut LedgerStore) -> Result<ExecutionReceipt, ExecutionError> {
        let contract = self.contract()?;
        let owner = execution_address(&contract.owner_address)?;
        let to = execution_address(&contract.to_address)?;

        internal_account::adjust_balance(state, &owner, -contract.amount)?;
        internal_account::credit_or_create(state, &to, contract.amount);

        debug!(from = %owner, to = %to, amount = contract.amount, "transfer applied");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Account;

    fn addr(b: u8) -> Address {
        Address::from_account_bytes([b; 20])
    }

    fn transfer_op(from: Address, to: Address, amount: i64) -> Operation {
        Operation::new(&OperationPayload::Transfer(TransferContract {
            owner_address: from.to_vec(),
            to_address: to.to_vec(),
            amount,
        }))
    }

    fn funded(owner: Address, balance: i64) -> LedgerStore {
        let mut state = LedgerStore::default();
        state.accounts.put(owner, Account::new(owner, balance));
        state
    }

    #[test]
    fn transfer_creates_recipient() {
        let (a, b) = (addr(1), addr(2));
        let mut state = funded(a, 100);
        let op = transfer_op(a, b, 40);
        let actuator = TransferActuator::new(&op);

        actuator.validate(&state).unwrap();
        let receipt = actuator.execute(&mut state).unwrap();

        assert!(receipt.is_success());
        assert_eq!(receipt.fee, 0);
        assert_eq!(internal_account::get_balance(&state, &a), 60);
        assert_eq!(internal_account::get_balance(&state, &b), 40);
        assert_eq!(state.total_balance(), 100);
    }

    #[test]
    fn rejects_self_transfer_and_bad_amounts() {
        let a = addr(1);
        let state = funded(a, 100);

        let op = transfer_op(a, a, 1);
        assert!(matches!(
            TransferActuator::new(&op).validate(&state),
            Err(ValidationError::InvalidParameter(_))
        ));

        let op = transfer_op(a, addr(2), 0);
        assert!(matches!(
            TransferActuator::new(&op).validate(&state),
            Err(ValidationError::InvalidAmount(_))
        ));

        let op = transfer_op(a, addr(2), 101);
        assert!(matches!(
            TransferActuator::new(&op).validate(&state),
            Err(ValidationError::InsufficientBalance(_))
        ));
    }

    #[test]
    fn rejects_recipient_overflow() {
        let (a, b) = (addr(1), addr(2));
        let mut state = funded(a, 100);
        state.accounts.put(b, Account::new(b, i64::MAX));

        let op = transfer_op(a, b, 1);
        assert!(matches!(
            TransferActuator::new(&op).validate(&state),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn unknown_owner_is_reported() {
        let state = LedgerStore::default();
        let op = transfer_op(addr(1), addr(2), 1);
        assert!(matches!(
            TransferActuator::new(&op).validate(&state),
            Err(ValidationError::AccountNotFound(_))
        ));
    }
}
