//! XFISH Sale Economics Module
//!
//! Implements the economic model of the sale:
//! - Price parameters and paid-amount to token-amount conversion
//! - The fixed 10% immediate + 9 x 10% monthly vesting schedule
//! - Aggregate raised/sold statistics

pub mod error;
pub mod pricing;
pub mod supply;
pub mod vesting;

pub use error::{EconomicsError, Result};
pub use pricing::{PriceCalculator, PriceParameters, PurchasePrice};
pub use supply::{SaleStats, SalesTracker};
pub use vesting::{NextRelease, VestingSchedule};

/// Economic constants
pub mod constants {
    /// Percentage denominator
    pub const PERCENT_DENOMINATOR: u64 = 100;

    /// Share of a purchase released at purchase time (10%)
    pub const IMMEDIATE_UNLOCK_PERCENT: u64 = 10;

    /// Share released at each monthly boundary (10%)
    pub const MONTHLY_UNLOCK_PERCENT: u64 = 10;

    /// Number of monthly tranches after the immediate unlock
    pub const VESTING_MONTHS: u64 = 9;

    /// Default tokens per USDT (1 USDT = 10,000 XFISH)
    pub const DEFAULT_USDT_PRICE: u64 = 10_000;

    /// Default USDT per native unit (1 ETH = 2,500 USDT)
    pub const DEFAULT_ETH_PRICE: u64 = 2_500;
}

#[cfg(test)]
mod tests {
    use super::constants::*;

    #[test]
    fn test_schedule_sums_to_whole() {
        let released = IMMEDIATE_UNLOCK_PERCENT + VESTING_MONTHS * MONTHLY_UNLOCK_PERCENT;
        assert_eq!(released, PERCENT_DENOMINATOR);
    }
}
