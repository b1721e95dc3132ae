//! Internal models for the state module
//! Records stored in the ledger collections plus the global parameters singleton.

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use trellis_common::ParameterConfig;

/// Account record. Maps are `BTreeMap` so iteration order is identical on
/// every node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    /// Native balance. Never negative after a committed operation.
    pub balance: i64,
    /// Stake weight backing the staked bandwidth quota.
    pub frozen_balance: i64,
    pub is_witness: bool,

    /// Staked bandwidth window.
    pub net_usage: u64,
    pub latest_consume_time: u64,

    /// Free bandwidth window.
    pub free_net_usage: u64,
    pub latest_consume_free_time: u64,

    /// Head block timestamp (ms) of the last charged operation.
    pub latest_operation_time: u64,

    /// Issued-asset holdings, asset name -> amount.
    pub assets: BTreeMap<String, i64>,
    /// Asset-sponsored bandwidth windows, asset name -> usage / slot.
    pub free_asset_net_usage: BTreeMap<String, u64>,
    pub latest_asset_operation_time: BTreeMap<String, u64>,
}

impl Account {
    pub fn new(address: Address, balance: i64) -> Self {
        Self {
            address,
            balance,
            frozen_balance: 0,
            is_witness: false,
            net_usage: 0,
            latest_consume_time: 0,
            free_net_usage: 0,
            latest_consume_free_time: 0,
            latest_operation_time: 0,
            assets: BTreeMap::new(),
            free_asset_net_usage: BTreeMap::new(),
            latest_asset_operation_time: BTreeMap::new(),
        }
    }

    pub fn with_frozen(mut self, frozen_balance: i64) -> Self {
        self.frozen_balance = frozen_balance;
        self
    }

    pub fn asset_balance(&self, name: &str) -> i64 {
        *self.assets.get(name).unwrap_or(&0)
    }

    pub fn free_asset_net_usage(&self, name: &str) -> u64 {
        *self.free_asset_net_usage.get(name).unwrap_or(&0)
    }

    pub fn latest_asset_operation_time(&self, name: &str) -> u64 {
        *self.latest_asset_operation_time.get(name).unwrap_or(&0)
    }
}

/// Registered block-producer candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Witness {
    pub address: Address,
    pub vote_count: i64,
    pub url: String,
}

impl Witness {
    pub fn new(address: Address, url: String) -> Self {
        Self {
            address,
            vote_count: 0,
            url,
        }
    }
}

/// Issued asset. The bandwidth engine only reads `owner_address` and
/// `free_asset_net_limit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetIssue {
    pub name: String,
    pub owner_address: Address,
    pub total_supply: i64,
    pub trx_num: i32,
    pub num: i32,
    pub start_time: i64,
    pub end_time: i64,
    pub description: String,
    pub url: String,
    pub free_asset_net_limit: i64,
}

/// Global parameters singleton. Governance owns every field except the
/// public-net window and the head pointers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalParameters {
    pub total_net_limit: i64,
    pub total_net_weight: i64,
    pub free_net_limit: i64,
    pub public_net_limit: i64,
    pub public_net_usage: u64,
    pub public_net_time: u64,
    pub account_upgrade_cost: i64,
    pub asset_issue_fee: i64,
    /// Timestamp (ms) of the head block.
    pub head_block_timestamp: u64,
    /// Time slot of the head block.
    pub head_slot: u64,
}

impl From<&ParameterConfig> for GlobalParameters {
    fn from(cfg: &ParameterConfig) -> Self {
        Self {
            total_net_limit: cfg.total_net_limit,
            total_net_weight: cfg.total_net_weight,
            free_net_limit: cfg.free_net_limit,
            public_net_limit: cfg.public_net_limit,
            public_net_usage: 0,
            public_net_time: 0,
            account_upgrade_cost: cfg.account_upgrade_cost,
            asset_issue_fee: cfg.asset_issue_fee,
            head_block_timestamp: 0,
            head_slot: 0,
        }
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        GlobalParameters::from(&ParameterConfig::default())
    }
}
