//! # Chain Constants
//!
//! Single source of truth for protocol constants shared by every crate.
//!
//! **CONSENSUS-CRITICAL**: every node must run with identical values here,
//! changing any of them is a hard fork.

// ════════════════════════════════════════════════════════════════════════════════
// TIME & WINDOW
// ════════════════════════════════════════════════════════════════════════════════

/// Interval between two produced blocks (ms). One block = one time slot.
pub const BLOCK_PRODUCED_INTERVAL_MS: u64 = 3_000;

/// Length of the bandwidth decay window (ms), one day.
pub const WINDOW_SIZE_MS: u64 = 24 * 3_600 * 1_000;

/// Fixed-point precision used while a usage counter is in averaged form.
pub const PRECISION: u64 = 1_000_000;

/// Upper bound on precision. Keeps every intermediate of the decay
/// arithmetic inside `u128` for any `u64` usage.
pub const MAX_PRECISION: u64 = u32::MAX as u64;

// ════════════════════════════════════════════════════════════════════════════════
// NETWORK LIMITS
// ════════════════════════════════════════════════════════════════════════════════

/// Bandwidth shared by all stakers per window (bytes).
pub const DEFAULT_TOTAL_NET_LIMIT: i64 = 43_200_000_000;

/// Free bandwidth granted to each account per window (bytes).
pub const DEFAULT_FREE_NET_LIMIT: i64 = 5_000;

/// Aggregate free bandwidth the whole network may burn per window (bytes).
pub const DEFAULT_PUBLIC_NET_LIMIT: i64 = 14_400_000_000;

/// Upper bound (exclusive) for an asset's sponsored free bandwidth.
pub const ONE_DAY_NET_LIMIT: i64 = 57_600_000_000;

// ════════════════════════════════════════════════════════════════════════════════
// COSTS (smallest native units)
// ════════════════════════════════════════════════════════════════════════════════

/// Cost of upgrading an account to a witness.
pub const DEFAULT_ACCOUNT_UPGRADE_COST: i64 = 9_999_000_000;

/// Cost of issuing a new asset.
pub const DEFAULT_ASSET_ISSUE_FEE: i64 = 1_024_000_000;

// ════════════════════════════════════════════════════════════════════════════════
// FIELD BOUNDS
// ════════════════════════════════════════════════════════════════════════════════

/// Maximum length of a registration URL (bytes).
pub const MAX_URL_LEN: usize = 256;

/// Maximum length of an asset name (bytes).
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// Maximum length of an asset description (bytes).
pub const MAX_ASSET_DESCRIPTION_LEN: usize = 200;

/// Reserved name of the native token; no issued asset may take it.
pub const NATIVE_TOKEN_NAME: &str = "trx";
