//! # Ledger State Module
//!
//! Entry point and facade for the ledger collections the execution core
//! reads and writes.
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `internal_store` | `KvStore` interface (get/put/has/delete) and `MemoryStore` |
//! | `internal_model` | Records: `Account`, `Witness`, `AssetIssue`, `GlobalParameters` |
//! | `internal_account` | Balance adjustment and first-credit account creation |
//!
//! ## Single writer
//!
//! `LedgerStore` is passed explicitly (`&` for validation, `&mut` for
//! execution and bandwidth charging). There is no ambient state.
//!
//! ## Sessions
//!
//! `begin_session` opens a journal on every collection and checkpoints the
//! global parameters. `rollback_session` restores exactly the records
//! written since then; `commit_session` keeps them. One session at a time.

pub mod internal_account;
pub mod internal_model;
pub mod internal_store;

pub use internal_model::{Account, AssetIssue, GlobalParameters, Witness};
pub use internal_store::{KvStore, MemoryStore};

use crate::error::StateError;
use crate::types::{Address, BLACK_HOLE_ADDRESS};
use trellis_common::ChainConfig;

#[derive(Debug, Clone)]
pub struct LedgerStore {
    pub accounts: MemoryStore<Address, Account>,
    pub assets: MemoryStore<String, AssetIssue>,
    pub witnesses: MemoryStore<Address, Witness>,
    pub properties: GlobalParameters,
    checkpoint: Option<GlobalParameters>,
}

impl PartialEq for LedgerStore {
    fn eq(&self, other: &Self) -> bool {
        self.accounts == other.accounts
            && self.assets == other.assets
            && self.witnesses == other.witnesses
            && self.properties == other.properties
    }
}

impl Eq for LedgerStore {}

impl LedgerStore {
    /// Empty ledger holding only the black-hole account.
    pub fn new(properties: GlobalParameters) -> Self {
        let mut accounts = MemoryStore::new();
        accounts.put(BLACK_HOLE_ADDRESS, Account::new(BLACK_HOLE_ADDRESS, 0));
        Self {
            accounts,
            assets: MemoryStore::new(),
            witnesses: MemoryStore::new(),
            properties,
            checkpoint: None,
        }
    }

    /// Genesis ledger from config. Genesis stake is added to the total net
    /// weight so staked quotas are immediately usable.
    pub fn from_config(cfg: &ChainConfig) -> Result<Self, StateError> {
        cfg.validate()
            .map_err(|e| StateError::InvalidGenesis(e.to_string()))?;

        let mut state = LedgerStore::new(GlobalParameters::from(&cfg.parameters));
        for entry in &cfg.genesis {
            let address = Address::from_hex(&entry.address)
                .map_err(|e| StateError::InvalidGenesis(format!("{}: {e}", entry.address)))?;
            if state.accounts.has(&address) {
                return Err(StateError::InvalidGenesis(format!(
                    "duplicate genesis account {address}"
                )));
            }
            state.accounts.put(
                address,
                Account::new(address, entry.balance).with_frozen(entry.frozen_balance),
            );
            state.properties.total_net_weight = state
                .properties
                .total_net_weight
                .checked_add(entry.frozen_balance)
                .ok_or_else(|| StateError::InvalidGenesis("total net weight overflow".into()))?;
        }
        Ok(state)
    }

    // ════════════════════════════════════════════════════════════════════════
    // GLOBAL PARAMETER ACCESSORS
    // ════════════════════════════════════════════════════════════════════════

    pub fn total_net_limit(&self) -> i64 {
        self.properties.total_net_limit
    }

    pub fn total_net_weight(&self) -> i64 {
        self.properties.total_net_weight
    }

    pub fn free_net_limit(&self) -> i64 {
        self.properties.free_net_limit
    }

    pub fn public_net_limit(&self) -> i64 {
        self.properties.public_net_limit
    }

    pub fn public_net_usage(&self) -> u64 {
        self.properties.public_net_usage
    }

    pub fn public_net_time(&self) -> u64 {
        self.properties.public_net_time
    }

    pub fn account_upgrade_cost(&self) -> i64 {
        self.properties.account_upgrade_cost
    }

    pub fn asset_issue_fee(&self) -> i64 {
        self.properties.asset_issue_fee
    }

    pub fn head_block_timestamp(&self) -> u64 {
        self.properties.head_block_timestamp
    }

    pub fn head_slot(&self) -> u64 {
        self.properties.head_slot
    }

    pub fn save_public_net_usage(&mut self, usage: u64) {
        self.properties.public_net_usage = usage;
    }

    pub fn save_public_net_time(&mut self, time: u64) {
        self.properties.public_net_time = time;
    }

    /// Move the head to a new block. The slot may stay (several
    /// transactions in one block) but never go back.
    pub fn advance_head(&mut self, slot: u64, timestamp: u64) -> Result<(), StateError> {
        if slot < self.properties.head_slot {
            return Err(StateError::HeadRegression {
                current: self.properties.head_slot,
                requested: slot,
            });
        }
        self.properties.head_slot = slot;
        self.properties.head_block_timestamp = timestamp;
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // SESSIONS
    // ════════════════════════════════════════════════════════════════════════

    /// # Panics
    /// If a session is already open.
    pub fn begin_session(&mut self) {
        assert!(self.checkpoint.is_none(), "ledger session already open");
        self.accounts.begin_journal();
        self.assets.begin_journal();
        self.witnesses.begin_journal();
        self.checkpoint = Some(self.properties.clone());
    }

    pub fn commit_session(&mut self) {
        self.accounts.commit_journal();
        self.assets.commit_journal();
        self.witnesses.commit_journal();
        self.checkpoint = None;
    }

    pub fn rollback_session(&mut self) {
        self.accounts.rollback_journal();
        self.assets.rollback_journal();
        self.witnesses.rollback_journal();
        if let Some(properties) = self.checkpoint.take() {
            self.properties = properties;
        }
    }

    pub fn in_session(&self) -> bool {
        self.checkpoint.is_some()
    }

    // ════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ════════════════════════════════════════════════════════════════════════

    pub fn black_hole_balance(&self) -> i64 {
        internal_account::get_balance(self, &BLACK_HOLE_ADDRESS)
    }

    /// Sum of every balance, black hole included. Constant across every
    /// operation in this crate.
    pub fn total_balance(&self) -> i128 {
        self.accounts.values().map(|a| a.balance as i128).sum()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        LedgerStore::new(GlobalParameters::default())
    }
}
