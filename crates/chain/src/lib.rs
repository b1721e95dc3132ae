//! # Trellis Chain Core Library
//!
//! Deterministic execution core of the Trellis ledger: bandwidth admission
//! and the validate/execute actuators behind every mutating operation.
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `types` | `Address` (21 bytes, `0x41` prefix), black-hole address |
//! | `tx` | `Operation` envelope, typed payloads, `Transaction` id |
//! | `state` | `LedgerStore`: accounts, assets, witnesses, global parameters |
//! | `bandwidth` | Decaying usage window and three-tier charging |
//! | `actuator` | `Actuator` trait and one variant per operation kind |
//! | `processor` | Atomic per-transaction pipeline and block application |
//! | `util` | Field checks shared by actuators (url, asset name, description) |
//! | `error` | Error enums for every layer |
//!
//! ## Pipeline
//!
//! ```text
//! Transaction
//!   └─ for each Operation (list order, inside a store session)
//!        ├─ BandwidthProcessor::consume_operation   asset → staked → free
//!        ├─ Actuator::validate                      read-only, first failure wins
//!        └─ Actuator::execute                       mutate, receipt
//!   commit the session only if every operation succeeded, else roll back
//! ```
//!
//! ## Determinism
//!
//! No floating point, no wall clock, no randomness. `now` is always the head
//! slot of the store, and all decay arithmetic is integer with a fixed
//! rounding rule. Two nodes applying the same transactions to the same store
//! end in byte-identical stores.

pub mod actuator;
pub mod bandwidth;
pub mod error;
pub mod processor;
pub mod state;
pub mod tx;
pub mod types;
pub mod util;

pub use actuator::{create_actuator, Actuator, ExecutionReceipt, ResultCode};
pub use bandwidth::{AccountNetUsage, BandwidthProcessor, ChargePath, UsageWindow};
pub use error::{
    BandwidthError, ExecutionError, PayloadError, ProcessError, StateError, ValidationError,
};
pub use processor::{TransactionProcessor, TxOutcome};
pub use state::LedgerStore;
pub use tx::{Operation, OperationKind, OperationPayload, Transaction};
pub use types::{Address, BLACK_HOLE_ADDRESS};

use std::path::Path;

use thiserror::Error;
use tracing::info;
use trellis_common::ChainConfig;

// ════════════════════════════════════════════════════════════════════════════
// LEDGER FACADE
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Store plus processor, built from one `ChainConfig`.
#[derive(Debug, Clone)]
pub struct Ledger {
    state: LedgerStore,
    processor: TransactionProcessor,
}

impl Ledger {
    pub fn from_config(cfg: &ChainConfig) -> Result<Self, LedgerError> {
        let state = LedgerStore::from_config(cfg)?;
        info!(
            accounts = state.accounts.len(),
            total_net_weight = state.total_net_weight(),
            "ledger initialized"
        );
        Ok(Self {
            state,
            processor: TransactionProcessor::from_config(cfg),
        })
    }

    /// Load, validate and apply a TOML config file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let cfg = trellis_common::load_from_file(path.as_ref())
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_config(&cfg)
    }

    pub fn state(&self) -> &LedgerStore {
        &self.state
    }

    pub fn processor(&self) -> &TransactionProcessor {
        &self.processor
    }

    /// Apply one transaction at the current head.
    pub fn submit_tx(&mut self, tx: &Transaction) -> TxOutcome {
        self.processor.process(&mut self.state, tx)
    }

    /// Advance the head and apply a block's transactions.
    pub fn apply_block(
        &mut self,
        slot: u64,
        timestamp: u64,
        txs: &[Transaction],
    ) -> Result<Vec<TxOutcome>, StateError> {
        self.processor
            .process_block(&mut self.state, slot, timestamp, txs)
    }

    /// Decayed bandwidth usage of `addr` at the head slot.
    pub fn account_net(&self, addr: &Address) -> Option<AccountNetUsage> {
        self.processor.bandwidth().account_net(&self.state, addr)
    }
}
