// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SWAPEO - CORE MODULE
//
// Primitives shared by the DEX contract, the execution environment and the CLI:
// 20-byte addresses, canonical pair keys, the error taxonomy, indexer events,
// runtime configuration and the host interfaces for tokens and the router.
// All financial arithmetic uses u128 atomic units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod address;
pub mod config;
pub mod error;
pub mod events;
pub mod host;

pub use address::{Address, PairKey};
pub use config::DexConfig;
pub use error::{DexError, DexResult};
pub use events::DexEvent;
pub use host::{Host, RouterHost, TokenHost};

/// Basis point denominator (10,000 bps = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;
/// Internal swap fee: 100 bps = 1% (`fee == amount_in / 100`)
pub const DEFAULT_SWAP_FEE_BPS: u128 = 100;
/// Protocol fee taken off the top of a forwarded swap: 50 bps = 0.5%
pub const DEFAULT_FORWARD_FEE_BPS: u128 = 50;
/// Router deadline offset from the block timestamp (5 minutes)
pub const DEFAULT_FORWARD_DEADLINE_SECS: u64 = 300;
/// A single swap may take at most 90% of the output reserve
pub const DEFAULT_MAX_OUTPUT_BPS: u128 = 9_000;
/// Upper bound for either configurable fee: 1000 bps = 10%
pub const MAX_FEE_BPS: u128 = 1_000;
/// Fixed-point scale for spot price and price impact
pub const PRICE_PRECISION: u128 = 1_000_000_000_000;

// ─────────────────────────────────────────────────────────────
// u128 ↔ String serialization (JSON doesn't support 128-bit integers)
// ─────────────────────────────────────────────────────────────

pub mod u128_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

/// Multiply then divide with overflow detection, rounding toward zero.
/// Every proportional split in the DEX goes through this so that rounding
/// always leaves the remainder with the pool.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> DexResult<u128> {
    if denominator == 0 {
        return Err(DexError::Overflow);
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(DexError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floors() {
        assert_eq!(mul_div(1_000, 3, 1_500).unwrap(), 2);
        assert_eq!(mul_div(500, 3, 1_500).unwrap(), 1);
        assert_eq!(mul_div(99, 2_000, 1_099).unwrap(), 180);
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(DexError::Overflow));
        assert_eq!(mul_div(1, 1, 0), Err(DexError::Overflow));
    }

    #[test]
    fn test_default_fee_is_one_percent() {
        for amount in [0u128, 1, 99, 100, 101, 12_345, 1_000_000_007] {
            assert_eq!(amount * DEFAULT_SWAP_FEE_BPS / BPS_DENOMINATOR, amount / 100);
        }
    }
}
