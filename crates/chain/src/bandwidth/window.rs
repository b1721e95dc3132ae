//! # Decaying Usage Window
//!
//! The single implementation of the usage-decay rule. Every bandwidth
//! counter in the ledger (staked, free, per-asset, issuer and public) is
//! advanced through [`UsageWindow::increase`] and nowhere else.
//!
//! ## Algorithm
//!
//! ```text
//! avg_last  = ceil(last_usage * P / W)
//! avg_delta = ceil(delta      * P / W)
//!
//! now == last_time          : avg_last unchanged
//! last_time + W > now       : avg_last = round_half_up(avg_last * (W - (now - last_time)) / W)
//! otherwise                 : avg_last = 0
//!
//! result = (avg_last + avg_delta) * W / P
//! ```
//!
//! The decay fraction is computed in integers only, rounding half up, so
//! results never depend on the host's floating point behaviour.
//!
//! **CONSENSUS-CRITICAL**: changing the rounding here forks the chain.

use trellis_common::chain_constants::{
    BLOCK_PRODUCED_INTERVAL_MS, MAX_PRECISION, PRECISION, WINDOW_SIZE_MS,
};
use trellis_common::BandwidthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    /// Window length in time slots (W).
    window_size: u64,
    /// Fixed-point precision (P).
    precision: u64,
}

impl UsageWindow {
    /// # Panics
    /// If either value is zero, or `precision` exceeds `MAX_PRECISION`.
    pub fn new(window_size: u64, precision: u64) -> Self {
        assert!(window_size > 0, "usage window must span at least one slot");
        assert!(precision > 0, "usage precision must be positive");
        assert!(
            precision <= MAX_PRECISION,
            "usage precision {precision} exceeds {MAX_PRECISION}"
        );
        Self {
            window_size,
            precision,
        }
    }

    /// Build from a validated config.
    pub fn from_config(cfg: &BandwidthConfig) -> Self {
        Self::new(cfg.window_slots(), cfg.precision)
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Decay `last_usage` from `last_time` to `now`, then add `usage`.
    ///
    /// # Panics
    /// If `now < last_time` (caller contract) or the result does not fit a
    /// `u64` (usage invariant already broken).
    pub fn increase(&self, last_usage: u64, usage: u64, last_time: u64, now: u64) -> u64 {
        let w = self.window_size as u128;
        let mut average_last_usage = self.average(last_usage);
        let average_usage = self.average(usage);

        if last_time != now {
            assert!(
                now > last_time,
                "usage window cannot move backwards: last {last_time}, now {now}"
            );
            let delta = (now - last_time) as u128;
            if delta < w {
                let remaining = w - delta;
                average_last_usage = (2 * average_last_usage * remaining + w) / (2 * w);
            } else {
                average_last_usage = 0;
            }
        }

        self.get_usage(average_last_usage + average_usage)
    }

    fn average(&self, usage: u64) -> u128 {
        divide_ceil(usage as u128 * self.precision as u128, self.window_size as u128)
    }

    fn get_usage(&self, average: u128) -> u64 {
        let raw = average * self.window_size as u128 / self.precision as u128;
        u64::try_from(raw).unwrap_or_else(|_| panic!("usage counter overflow: {raw}"))
    }
}

impl Default for UsageWindow {
    fn default() -> Self {
        Self::new(WINDOW_SIZE_MS / BLOCK_PRODUCED_INTERVAL_MS, PRECISION)
    }
}

fn divide_ceil(numerator: u128, denominator: u128) -> u128 {
    numerator / denominator + u128::from(numerator % denominator > 0)
}
