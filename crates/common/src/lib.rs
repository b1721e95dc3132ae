//! # Trellis Common Crate
//!
//! Shared protocol constants and configuration loading.
//!
//! ## Modules
//! - `chain_constants`: consensus-critical constants (window, precision, limits, costs)
//! - `config`: TOML chain configuration (`ChainConfig`)

pub mod chain_constants;
pub mod config;

pub use config::{load_from_file, BandwidthConfig, ChainConfig, GenesisAccount, ParameterConfig};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
