//! Chain config loader using TOML and serde.
//! Every field has a default, so an empty file yields a usable chain.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::chain_constants::{
    BLOCK_PRODUCED_INTERVAL_MS, DEFAULT_ACCOUNT_UPGRADE_COST, DEFAULT_ASSET_ISSUE_FEE,
    DEFAULT_FREE_NET_LIMIT, DEFAULT_PUBLIC_NET_LIMIT, DEFAULT_TOTAL_NET_LIMIT, MAX_PRECISION,
    PRECISION, WINDOW_SIZE_MS,
};
use crate::Result;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BandwidthConfig {
    /// Block interval in ms; one block is one time slot.
    pub block_interval_ms: u64,

    /// Decay window length in ms.
    pub window_size_ms: u64,

    /// Fixed-point precision for averaged usage.
    pub precision: u64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        BandwidthConfig {
            block_interval_ms: BLOCK_PRODUCED_INTERVAL_MS,
            window_size_ms: WINDOW_SIZE_MS,
            precision: PRECISION,
        }
    }
}

impl BandwidthConfig {
    /// Window length measured in time slots.
    pub fn window_slots(&self) -> u64 {
        if self.block_interval_ms == 0 {
            return 0;
        }
        self.window_size_ms / self.block_interval_ms
    }
}

/// Genesis values of the global parameters record.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ParameterConfig {
    pub total_net_limit: i64,
    pub total_net_weight: i64,
    pub free_net_limit: i64,
    pub public_net_limit: i64,
    pub account_upgrade_cost: i64,
    pub asset_issue_fee: i64,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        ParameterConfig {
            total_net_limit: DEFAULT_TOTAL_NET_LIMIT,
            total_net_weight: 0,
            free_net_limit: DEFAULT_FREE_NET_LIMIT,
            public_net_limit: DEFAULT_PUBLIC_NET_LIMIT,
            account_upgrade_cost: DEFAULT_ACCOUNT_UPGRADE_COST,
            asset_issue_fee: DEFAULT_ASSET_ISSUE_FEE,
        }
    }
}

/// Account seeded into the store at genesis.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GenesisAccount {
    /// Hex address (optionally `0x` prefixed).
    pub address: String,

    pub balance: i64,

    #[serde(default)]
    pub frozen_balance: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ChainConfig {
    pub bandwidth: BandwidthConfig,
    pub parameters: ParameterConfig,
    pub genesis: Vec<GenesisAccount>,
}

impl ChainConfig {
    /// Reject values the execution core cannot run with.
    ///
    /// `precision` must be at least the window length in slots, otherwise
    /// a counter does not survive the ceil/floor round trip unchanged, and
    /// at most `MAX_PRECISION`.
    pub fn validate(&self) -> Result<()> {
        let slots = self.bandwidth.window_slots();
        if slots == 0 {
            return Err(format!(
                "window of {} ms is shorter than one {} ms block",
                self.bandwidth.window_size_ms, self.bandwidth.block_interval_ms
            )
            .into());
        }
        if self.bandwidth.precision < slots {
            return Err(format!(
                "precision {} must be >= window slots {}",
                self.bandwidth.precision, slots
            )
            .into());
        }
        if self.bandwidth.precision > MAX_PRECISION {
            return Err(format!(
                "precision {} must be <= {MAX_PRECISION}",
                self.bandwidth.precision
            )
            .into());
        }

        let p = &self.parameters;
        let named = [
            ("total_net_limit", p.total_net_limit),
            ("total_net_weight", p.total_net_weight),
            ("free_net_limit", p.free_net_limit),
            ("public_net_limit", p.public_net_limit),
            ("account_upgrade_cost", p.account_upgrade_cost),
            ("asset_issue_fee", p.asset_issue_fee),
        ];
        for (name, value) in named {
            if value < 0 {
                return Err(format!("{name} must not be negative, got {value}").into());
            }
        }

        for account in &self.genesis {
            if account.balance < 0 || account.frozen_balance < 0 {
                return Err(format!("genesis account {} has a negative amount", account.address).into());
            }
        }
        Ok(())
    }
}

/// Load and validate config from a TOML file path.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ChainConfig> {
    let p = path.as_ref();
    let s = fs::read_to_string(p)?;
    let cfg: ChainConfig = toml::from_str(&s)?;
    cfg.validate()?;
    debug!(
        path = %p.display(),
        window_slots = cfg.bandwidth.window_slots(),
        genesis_accounts = cfg.genesis.len(),
        "chain config loaded"
    );
    Ok(cfg)
}
