//! XFISH Sale Core Library
//!
//! Shared primitives for the token sale: account identities, the asset
//! selector, amount/time aliases and decimal unit handling.

pub mod address;
pub mod asset;
pub mod error;
pub mod units;

pub use address::Address;
pub use asset::Asset;
pub use error::{CoreError, Result};
pub use units::{format_units, parse_units};

pub use alloy_primitives::U256;

/// Atomic amount of native currency or sale token (18 decimals).
///
/// A full 256-bit unsigned integer. Its operators wrap on overflow, so
/// accounting code goes through the `checked_*` and `saturating_*` methods.
pub type Amount = U256;

/// Seconds since Unix epoch.
pub type Timestamp = u64;

/// Shared constants
pub mod constants {
    use crate::Amount;

    /// Decimal places of both the native currency and the sale token
    pub const DECIMALS: u32 = 18;

    /// One whole token / native unit in base units (10^18)
    pub const UNIT: Amount = Amount::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

    /// One vesting month (30 days) in seconds
    pub const MONTH_DURATION: u64 = 30 * 24 * 60 * 60;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(
            constants::UNIT,
            Amount::from(10u128.pow(constants::DECIMALS))
        );
        assert_eq!(constants::UNIT.to_string(), "1000000000000000000");
        assert_eq!(constants::MONTH_DURATION, 2_592_000);
    }
}
