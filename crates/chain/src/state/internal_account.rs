//! Internal account management functions
//! Balance movement helpers shared by the actuators. Logic only, not
//! `LedgerStore` methods.

use super::internal_store::KvStore;
use super::{Account, LedgerStore};
use crate::error::BalanceError;
use crate::types::Address;

pub fn get_balance(state: &LedgerStore, addr: &Address) -> i64 {
    state.accounts.get(addr).map(|a| a.balance).unwrap_or(0)
}

/// Apply a signed delta to an existing account's balance.
///
/// Refuses (without touching the store) if the account is missing or the
/// result would be negative. Overflow panics.
pub fn adjust_balance(
    state: &mut LedgerStore,
    addr: &Address,
    delta: i64,
) -> Result<(), BalanceError> {
    let mut account = state
        .accounts
        .get(addr)
        .ok_or(BalanceError::AccountNotFound(*addr))?;
    let next = checked_balance(account.balance, delta, addr);
    if next < 0 {
        return Err(BalanceError::Insufficient {
            address: *addr,
            balance: account.balance,
            delta,
        });
    }
    account.balance = next;
    state.accounts.put(*addr, account);
    Ok(())
}

/// Credit `amount`, creating the account on first credit.
pub fn credit_or_create(state: &mut LedgerStore, addr: &Address, amount: i64) {
    let mut account = state
        .accounts
        .get(addr)
        .unwrap_or_else(|| Account::new(*addr, 0));
    account.balance = checked_balance(account.balance, amount, addr);
    state.accounts.put(*addr, account);
}

/// Move issued-asset units, creating the recipient on first credit.
pub fn transfer_asset_raw(
    state: &mut LedgerStore,
    from: &Address,
    to: &Address,
    name: &str,
    amount: i64,
) -> Result<(), BalanceError> {
    let mut sender = state
        .accounts
        .get(from)
        .ok_or(BalanceError::AccountNotFound(*from))?;
    let held = sender.asset_balance(name);
    if held < amount {
        return Err(BalanceError::Insufficient {
            address: *from,
            balance: held,
            delta: -amount,
        });
    }
    sender.assets.insert(name.to_string(), held - amount);
    state.accounts.put(*from, sender);

    let mut recipient = state
        .accounts
        .get(to)
        .unwrap_or_else(|| Account::new(*to, 0));
    let next = checked_balance(recipient.asset_balance(name), amount, to);
    recipient.assets.insert(name.to_string(), next);
    state.accounts.put(*to, recipient);
    Ok(())
}

fn checked_balance(balance: i64, delta: i64, addr: &Address) -> i64 {
    balance
        .checked_add(delta)
        .unwrap_or_else(|| panic!("balance overflow on account {addr}: {balance} + {delta}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GlobalParameters;

    fn addr(b: u8) -> Address {
        Address::from_account_bytes([b; 20])
    }

    #[test]
    fn adjust_balance_refuses_negative_without_mutation() {
        let mut state = LedgerStore::new(GlobalParameters::default());
        state.accounts.put(addr(1), Account::new(addr(1), 10));

        let err = adjust_balance(&mut state, &addr(1), -11).unwrap_err();
        assert!(matches!(err, BalanceError::Insufficient { balance: 10, .. }));
        assert_eq!(get_balance(&state, &addr(1)), 10);

        adjust_balance(&mut state, &addr(1), -10).unwrap();
        assert_eq!(get_balance(&state, &addr(1)), 0);
    }

    #[test]
    fn adjust_balance_requires_account() {
        let mut state = LedgerStore::new(GlobalParameters::default());
        assert_eq!(
            adjust_balance(&mut state, &addr(9), 5),
            Err(BalanceError::AccountNotFound(addr(9)))
        );
    }

    #[test]
    fn credit_creates_account() {
        let mut state = LedgerStore::new(GlobalParameters::default());
        credit_or_create(&mut state, &addr(2), 42);
        assert_eq!(get_balance(&state, &addr(2)), 42);
    }

    #[test]
    #[should_panic(expected = "balance overflow")]
    fn credit_overflow_is_fatal() {
        let mut state = LedgerStore::new(GlobalParameters::default());
        state.accounts.put(addr(3), Account::new(addr(3), i64::MAX));
        credit_or_create(&mut state, &addr(3), 1);
    }
}
