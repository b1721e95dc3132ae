//! Asset issuance.
//!
//! Validation order (first failure wins):
//!
//! | # | Check | Error |
//! |---|-------|-------|
//! | 1 | payload shape | `MalformedPayload` |
//! | 2 | owner address, envelope signer | `InvalidAddress` |
//! | 3 | `valid_asset_name` | `InvalidAssetName` |
//! | 4 | `total_supply > 0` | `InvalidAmount` |
//! | 5 | `trx_num > 0`, `num > 0` | `InvalidAmount` |
//! | 6 | `valid_url` | `InvalidUrl` |
//! | 7 | `valid_description` | `InvalidDescription` |
//! | 8 | `0 <= free_asset_net_limit < ONE_DAY_NET_LIMIT` | `InvalidParameter` |
//! | 9 | owner exists | `AccountNotFound` |
//! | 10 | name not taken | `AlreadyExists` |
//! | 11 | balance >= `asset_issue_fee` | `InsufficientBalance` |
//!
//! Execute stores the asset, credits the whole supply to the owner and
//! moves the issue fee to the black hole.

use tracing::debug;
use trellis_common::chain_constants::ONE_DAY_NET_LIMIT;

use super::{
    ensure_envelope_owner, execution_address, parse_address, receipt_fee, Actuator,
    ExecutionReceipt,
};
use crate::error::{ExecutionError, PayloadError, ValidationError};
use crate::state::{internal_account, AssetIssue, KvStore, LedgerStore};
use crate::tx::{AssetIssueContract, Operation, OperationKind, OperationPayload};
use crate::types::{readable_address, Address, BLACK_HOLE_ADDRESS};
use crate::util::{valid_asset_name, valid_description, valid_url};

pub struct AssetIssueActuator<'a> {
    operation: &'a Operation,
}

impl<'a> AssetIssueActuator<'a> {
    pub fn new(operation: &'a Operation) -> Self {
        Self { operation }
    }

    fn contract(&self) -> Result<AssetIssueContract, PayloadError> {
        match self.operation.decode_payload()? {
            OperationPayload::AssetIssue(contract) => Ok(contract),
            other => Err(PayloadError::TypeMismatch {
                expected: OperationKind::AssetIssue,
                actual: other.kind(),
            }),
        }
    }
}

impl Actuator for AssetIssueActuator<'_> {
    fn validate(&self, state: &LedgerStore) -> Result<(), ValidationError> {
        let c = self.contract()?;
        let owner = parse_address(&c.owner_address, "Invalid ownerAddress")?;
        ensure_envelope_owner(self.operation, &owner)?;

        if !valid_asset_name(&c.name) {
            return Err(ValidationError::InvalidAssetName("Invalid assetName".into()));
        }
        if c.total_supply <= 0 {
            return Err(ValidationError::InvalidAmount(
                "TotalSupply must greater than 0!".into(),
            ));
        }
        if c.trx_num <= 0 {
            return Err(ValidationError::InvalidAmount("TrxNum must greater than 0!".into()));
        }
        if c.num <= 0 {
            return Err(ValidationError::InvalidAmount("Num must greater than 0!".into()));
        }
        if !valid_url(&c.url) {
            return Err(ValidationError::InvalidUrl("Invalid url".into()));
        }
        if !valid_description(&c.description) {
            return Err(ValidationError::InvalidDescription("Invalid description".into()));
        }
        if c.free_asset_net_limit < 0 || c.free_asset_net_limit >= ONE_DAY_NET_LIMIT {
            return Err(ValidationError::InvalidParameter(format!(
                "Invalid FreeAssetNetLimit {}",
                c.free_asset_net_limit
            )));
        }

        let account = state.accounts.get(&owner).ok_or_else(|| {
            ValidationError::AccountNotFound(format!(
                "account[{}] not exists",
                readable_address(&c.owner_address)
            ))
        })?;
        if state.assets.has(&c.name) {
            return Err(ValidationError::AlreadyExists("Token exists".into()));
        }
        if account.balance < state.asset_issue_fee() {
            return Err(ValidationError::InsufficientBalance(
                "No enough balance for fee!".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, state: &mut LedgerStore) -> Result<ExecutionReceipt, ExecutionError> {
        let c = self.contract()?;
        let owner = execution_address(&c.owner_address)?;
        let url = String::from_utf8(c.url)
            .map_err(|e| ExecutionError::MalformedPayload(e.to_string()))?;
        let fee = state.asset_issue_fee();

        let mut account = state
            .accounts
            .get(&owner)
            .ok_or_else(|| ExecutionError::AccountNotFound(owner.to_string()))?;
        if account.balance < fee {
            return Err(ExecutionError::InsufficientBalance(format!(
                "account {owner} balance {} < issue fee {fee}",
                account.balance
            )));
        }

        state.assets.put(
            c.name.clone(),
            AssetIssue {
                name: c.name.clone(),
                owner_address: owner,
                total_supply: c.total_supply,
                trx_num: c.trx_num,
                num: c.num,
                start_time: c.start_time,
                end_time: c.end_time,
                description: c.description,
                url,
                free_asset_net_limit: c.free_asset_net_limit,
            },
        );
        account.assets.insert(c.name.clone(), c.total_supply);
        account.balance -= fee;
        state.accounts.put(owner, account);
        internal_account::credit_or_create(state, &BLACK_HOLE_ADDRESS, fee);

        debug!(asset = %c.name, issuer = %owner, supply = c.total_supply, fee, "asset issued");
        Ok(ExecutionReceipt::success(receipt_fee(fee)))
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
    use crate::state::{Account, GlobalParameters};

    const FEE: i64 = 1_024_000_000;

    fn addr(b: u8) -> Address {
        Address::from_account_bytes([b; 20])
    }

    fn contract(owner: Address) -> AssetIssueContract {
        AssetIssueContract {
            owner_address: owner.to_vec(),
            name: "gold".into(),
            total_supply: 10_000,
            trx_num: 1,
            num: 10,
            start_time: 1,
            end_time: 2,
            description: "gold coin".into(),
            url: b"https://gold.example".to_vec(),
            free_asset_net_limit: 1_000,
        }
    }

    fn issue_op(c: AssetIssueContract) -> Operation {
        Operation::new(&OperationPayload::AssetIssue(c))
    }

    fn store_with(owner: Address, balance: i64) -> LedgerStore {
        let mut state = LedgerStore::new(GlobalParameters {
            asset_issue_fee: FEE,
            ..GlobalParameters::default()
        });
        state.accounts.put(owner, Account::new(owner, balance));
        state
    }

    #[test]
    fn issue_credits_supply_and_burns_fee() {
        let owner = addr(1);
        let mut state = store_with(owner, FEE + 5);
        let op = issue_op(contract(owner));
        let actuator = AssetIssueActuator::new(&op);

        actuator.validate(&state).unwrap();
        let receipt = actuator.execute(&mut state).unwrap();

        assert_eq!(receipt.fee, FEE as u64);
        let account = state.accounts.get(&owner).unwrap();
        assert_eq!(account.balance, 5);
        assert_eq!(account.asset_balance("gold"), 10_000);
        assert_eq!(state.black_hole_balance(), FEE);
        let asset = state.assets.get(&"gold".to_string()).unwrap();
        assert_eq!(asset.owner_address, owner);
        assert_eq!(asset.free_asset_net_limit, 1_000);
        assert_eq!(state.total_balance(), (FEE + 5) as i128);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let owner = addr(1);
        let mut state = store_with(owner, FEE * 2);
        let op = issue_op(contract(owner));
        let actuator = AssetIssueActuator::new(&op);
        actuator.validate(&state).unwrap();
        actuator.execute(&mut state).unwrap();

        assert_eq!(
            actuator.validate(&state),
            Err(ValidationError::AlreadyExists("Token exists".into()))
        );
    }

    #[test]
    fn field_checks() {
        let owner = addr(1);
        let state = store_with(owner, FEE);

        let mut c = contract(owner);
        c.total_supply = 0;
        assert_eq!(
            AssetIssueActuator::new(&issue_op(c)).validate(&state),
            Err(ValidationError::InvalidAmount(
                "TotalSupply must greater than 0!".into()
            ))
        );

        let mut c = contract(owner);
        c.name = "trx".into();
        assert!(matches!(
            AssetIssueActuator::new(&issue_op(c)).validate(&state),
            Err(ValidationError::InvalidAssetName(_))
        ));

        let mut c = contract(owner);
        c.description = "d".repeat(201);
        assert!(matches!(
            AssetIssueActuator::new(&issue_op(c)).validate(&state),
            Err(ValidationError::InvalidDescription(_))
        ));

        let mut c = contract(owner);
        c.free_asset_net_limit = ONE_DAY_NET_LIMIT;
        assert!(matches!(
            AssetIssueActuator::new(&issue_op(c)).validate(&state),
            Err(ValidationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn fee_shortfall_leaves_state_untouched() {
        let owner = addr(1);
        let state = store_with(owner, FEE - 1);
        let before = state.clone();
        let op = issue_op(contract(owner));

        assert!(matches!(
            AssetIssueActuator::new(&op).validate(&state),
            Err(ValidationError::InsufficientBalance(_))
        ));
        assert_eq!(state, before);
    }
}
