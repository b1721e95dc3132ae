//! # Bandwidth Accounting
//!
//! Admission gate in front of every actuator. Each operation is charged
//! its encoded size in bytes against the first tier with room:
//!
//! | Order | Tier | Quota | Counters charged |
//! |-------|------|-------|------------------|
//! | 1 | Asset-sponsored (asset transfers only) | asset free limit AND issuer staked quota | payer per-asset usage, issuer net usage |
//! | 2 | Staked | `frozen * total_net_limit / total_net_weight` | account net usage |
//! | 3 | Free | account free limit AND public net limit | account free usage, public net usage |
//!
//! A tier without room is "not eligible" and control falls through. Only
//! when all applicable tiers miss is the operation rejected with
//! `BandwidthExhausted`. All counters decay through [`UsageWindow`], and
//! `now` is always the head slot of the store.

pub mod window;

pub use window::UsageWindow;

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::BandwidthError;
use crate::state::{Account, KvStore, LedgerStore};
use crate::tx::{Operation, OperationKind, OperationPayload, Transaction};
use crate::types::{readable_address, Address};
use trellis_common::ChainConfig;

/// Tier that absorbed an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePath {
    AssetSponsored,
    Staked,
    FreeNet,
}

/// Decayed usage view of one account, for external queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNetUsage {
    pub net_used: u64,
    pub net_limit: i64,
    pub free_net_used: u64,
    pub free_net_limit: i64,
    pub public_net_used: u64,
    pub public_net_limit: i64,
    pub asset_net_used: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BandwidthProcessor {
    window: UsageWindow,
}

impl BandwidthProcessor {
    pub fn new(window: UsageWindow) -> Self {
        Self { window }
    }

    pub fn from_config(cfg: &ChainConfig) -> Self {
        Self::new(UsageWindow::from_config(&cfg.bandwidth))
    }

    /// Charge every operation of `tx` in list order. Stops at the first
    /// rejection; charges already applied to `state` for earlier operations
    /// stay, so callers that need atomicity run this inside a store session.
    pub fn consume_bandwidth(
        &self,
        state: &mut LedgerStore,
        tx: &Transaction,
    ) -> Result<(), BandwidthError> {
        for op in &tx.operations {
            self.consume_operation(state, op)?;
        }
        Ok(())
    }

    /// Charge a single operation.
    pub fn consume_operation(
        &self,
        state: &mut LedgerStore,
        op: &Operation,
    ) -> Result<ChargePath, BandwidthError> {
        let bytes = op.encoded_size();
        let readable = readable_address(&op.owner_address);
        let account = op
            .owner()
            .and_then(|addr| state.accounts.get(&addr))
            .ok_or_else(|| BandwidthError::AccountNotFound(readable.clone()))?;
        let now = state.head_slot();

        if op.kind == OperationKind::TransferAsset
            && self.use_asset_account_net(state, op, &account, bytes, now)?
        {
            return Ok(ChargePath::AssetSponsored);
        }

        if self.use_account_net(state, account.clone(), bytes, now) {
            return Ok(ChargePath::Staked);
        }

        if self.use_free_net(state, account, bytes, now) {
            return Ok(ChargePath::FreeNet);
        }

        warn!(owner = %readable, bytes, "bandwidth is not enough");
        Err(BandwidthError::BandwidthExhausted(format!(
            "account {readable} cannot cover {bytes} bytes"
        )))
    }

    /// Decay every counter of `account` to `now` without charging.
    ///
    /// Timestamps are left untouched, so the result is a view: persisting it
    /// would decay the same interval twice on the next charge.
    pub fn update_usage(&self, account: &mut Account, now: u64) {
        account.net_usage = self
            .window
            .increase(account.net_usage, 0, account.latest_consume_time, now);
        account.free_net_usage =
            self.window
                .increase(account.free_net_usage, 0, account.latest_consume_free_time, now);

        let names: Vec<String> = account.free_asset_net_usage.keys().cloned().collect();
        for name in names {
            let last_time = account.latest_asset_operation_time(&name);
            let usage = self
                .window
                .increase(account.free_asset_net_usage(&name), 0, last_time, now);
            account.free_asset_net_usage.insert(name, usage);
        }
    }

    /// Current decayed usage and limits of `addr` at the head slot.
    pub fn account_net(&self, state: &LedgerStore, addr: &Address) -> Option<AccountNetUsage> {
        let mut account = state.accounts.get(addr)?;
        let now = state.head_slot();
        self.update_usage(&mut account, now);
        Some(AccountNetUsage {
            net_used: account.net_usage,
            net_limit: staked_net_limit(state, account.frozen_balance),
            free_net_used: account.free_net_usage,
            free_net_limit: state.free_net_limit(),
            public_net_used: self.window.increase(
                state.public_net_usage(),
                0,
                state.public_net_time(),
                now,
            ),
            public_net_limit: state.public_net_limit(),
            asset_net_used: account.free_asset_net_usage,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // TIERS
    // ════════════════════════════════════════════════════════════════════════

    fn use_asset_account_net(
        &self,
        state: &mut LedgerStore,
        op: &Operation,
        account: &Account,
        bytes: u64,
        now: u64,
    ) -> Result<bool, BandwidthError> {
        let asset_name = match op.decode_payload() {
            Ok(OperationPayload::TransferAsset(contract)) => contract.asset_name,
            _ => {
                debug!(owner = %account.address, "undecodable asset transfer, skipping sponsored tier");
                return Ok(false);
            }
        };
        let asset = state
            .assets
            .get(&asset_name)
            .ok_or_else(|| BandwidthError::AssetNotFound(asset_name.clone()))?;

        let free_asset_usage = self.window.increase(
            account.free_asset_net_usage(&asset_name),
            0,
            account.latest_asset_operation_time(&asset_name),
            now,
        );
        if !has_room(asset.free_asset_net_limit, free_asset_usage, bytes) {
            debug!(asset = %asset_name, "asset free bandwidth is not enough");
            return Ok(false);
        }

        let same_owner = asset.owner_address == account.address;
        let issuer = if same_owner {
            account.clone()
        } else {
            match state.accounts.get(&asset.owner_address) {
                Some(issuer) => issuer,
                None => {
                    debug!(asset = %asset_name, issuer = %asset.owner_address, "asset issuer missing");
                    return Ok(false);
                }
            }
        };

        let issuer_limit = staked_net_limit(state, issuer.frozen_balance);
        let issuer_usage = self
            .window
            .increase(issuer.net_usage, 0, issuer.latest_consume_time, now);
        if !has_room(issuer_limit, issuer_usage, bytes) {
            debug!(asset = %asset_name, issuer = %issuer.address, "issuer bandwidth is not enough");
            return Ok(false);
        }

        let new_issuer_usage = self.window.increase(issuer_usage, bytes, now, now);
        let new_free_asset_usage = self.window.increase(free_asset_usage, bytes, now, now);
        debug!(
            old_issuer_usage = issuer_usage,
            new_issuer_usage,
            old_asset_usage = free_asset_usage,
            new_asset_usage = new_free_asset_usage,
            "asset-sponsored bandwidth charged"
        );

        let mut payer = account.clone();
        payer.latest_operation_time = state.head_block_timestamp();
        payer.latest_asset_operation_time.insert(asset_name.clone(), now);
        payer.free_asset_net_usage.insert(asset_name, new_free_asset_usage);

        if same_owner {
            payer.net_usage = new_issuer_usage;
            payer.latest_consume_time = now;
            state.accounts.put(payer.address, payer);
        } else {
            let mut issuer = issuer;
            issuer.net_usage = new_issuer_usage;
            issuer.latest_consume_time = now;
            state.accounts.put(payer.address, payer);
            state.accounts.put(issuer.address, issuer);
        }
        Ok(true)
    }

    fn use_account_net(
        &self,
        state: &mut LedgerStore,
        mut account: Account,
        bytes: u64,
        now: u64,
    ) -> bool {
        let net_limit = staked_net_limit(state, account.frozen_balance);
        let net_usage = self
            .window
            .increase(account.net_usage, 0, account.latest_consume_time, now);

        if !has_room(net_limit, net_usage, bytes) {
            debug!(owner = %account.address, "net usage is running out, trying free net");
            return false;
        }

        let new_net_usage = self.window.increase(net_usage, bytes, now, now);
        debug!(old = net_usage, new = new_net_usage, "staked bandwidth charged");
        account.net_usage = new_net_usage;
        account.latest_consume_time = now;
        account.latest_operation_time = state.head_block_timestamp();
        state.accounts.put(account.address, account);
        true
    }

    fn use_free_net(
        &self,
        state: &mut LedgerStore,
        mut account: Account,
        bytes: u64,
        now: u64,
    ) -> bool {
        let free_net_usage = self.window.increase(
            account.free_net_usage,
            0,
            account.latest_consume_free_time,
            now,
        );
        if !has_room(state.free_net_limit(), free_net_usage, bytes) {
            debug!(owner = %account.address, "free net usage is running out");
            return false;
        }

        let public_net_usage =
            self.window
                .increase(state.public_net_usage(), 0, state.public_net_time(), now);
        if !has_room(state.public_net_limit(), public_net_usage, bytes) {
            debug!(owner = %account.address, "public net usage is running out");
            return false;
        }

        let new_free_net_usage = self.window.increase(free_net_usage, bytes, now, now);
        let new_public_net_usage = self.window.increase(public_net_usage, bytes, now, now);
        debug!(
            old_free = free_net_usage,
            new_free = new_free_net_usage,
            old_public = public_net_usage,
            new_public = new_public_net_usage,
            "free bandwidth charged"
        );

        account.free_net_usage = new_free_net_usage;
        account.latest_consume_free_time = now;
        account.latest_operation_time = state.head_block_timestamp();
        state.save_public_net_usage(new_public_net_usage);
        state.save_public_net_time(now);
        state.accounts.put(account.address, account);
        true
    }
}

/// Staked quota of an account holding `frozen_balance`. Zero while no
/// stake exists network-wide.
pub fn staked_net_limit(state: &LedgerStore, frozen_balance: i64) -> i64 {
    let weight = state.total_net_weight();
    if weight <= 0 {
        return 0;
    }
    let limit = frozen_balance as i128 * state.total_net_limit() as i128 / weight as i128;
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn has_room(limit: i64, used: u64, bytes: u64) -> bool {
    bytes as i128 <= limit as i128 - used as i128
}
