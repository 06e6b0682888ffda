//! Vesting schedule
//!
//! A fixed schedule anchored at the first purchase:
//! - 10% of the total is released immediately
//! - 10% more unlocks at each 30-day boundary, nine times
//! - fully vested at `start + 9 * MONTH_DURATION`
//!
//! Percentages are floor divisions. Any rounding remainder is released at the
//! final boundary so the schedule always sums to exactly `total`.

use crate::constants::{
    IMMEDIATE_UNLOCK_PERCENT, MONTHLY_UNLOCK_PERCENT, PERCENT_DENOMINATOR, VESTING_MONTHS,
};
use serde::{Deserialize, Serialize};
use xfish_core::constants::MONTH_DURATION;
use xfish_core::{Amount, Timestamp};

/// Next unlock boundary for a position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NextRelease {
    pub release_time: Timestamp,
    pub amount: Amount,
}

pub struct VestingSchedule;

impl VestingSchedule {
    /// Tokens released at purchase time
    pub fn immediate_unlock(total: Amount) -> Amount {
        percent_of(total, IMMEDIATE_UNLOCK_PERCENT)
    }

    /// Tokens released at each monthly boundary
    pub fn monthly_tranche(total: Amount) -> Amount {
        percent_of(total, MONTHLY_UNLOCK_PERCENT)
    }

    /// Whole months since `start`, clamped to `[0, VESTING_MONTHS]`
    pub fn months_elapsed(start: Timestamp, now: Timestamp) -> u64 {
        (now.saturating_sub(start) / MONTH_DURATION).min(VESTING_MONTHS)
    }

    pub fn fully_vested_at(start: Timestamp) -> Timestamp {
        start.saturating_add(VESTING_MONTHS * MONTH_DURATION)
    }

    /// Total unlocked (claimed or not) at `now`
    pub fn unlocked_amount(total: Amount, start: Timestamp, now: Timestamp) -> Amount {
        let months = Self::months_elapsed(start, now);
        if months >= VESTING_MONTHS {
            return total;
        }

        let vested = Self::monthly_tranche(total).saturating_mul(Amount::from(months));
        Self::immediate_unlock(total)
            .saturating_add(vested)
            .min(total)
    }

    /// Unlocked but not yet claimed
    pub fn claimable_amount(
        total: Amount,
        claimed: Amount,
        start: Timestamp,
        now: Timestamp,
    ) -> Amount {
        Self::unlocked_amount(total, start, now).saturating_sub(claimed)
    }

    /// The next boundary that has not yet occurred, or `None` once fully vested
    pub fn next_release(total: Amount, start: Timestamp, now: Timestamp) -> Option<NextRelease> {
        let months = Self::months_elapsed(start, now);
        if months >= VESTING_MONTHS {
            return None;
        }

        Some(NextRelease {
            release_time: start.saturating_add((months + 1) * MONTH_DURATION),
            amount: Self::monthly_tranche(total),
        })
    }
}

/// `floor(amount * percent / 100)` without overflowing for any `percent <= 100`
fn percent_of(amount: Amount, percent: u64) -> Amount {
    let denominator = Amount::from(PERCENT_DENOMINATOR);
    let percent = Amount::from(percent);
    (amount / denominator * percent).saturating_add(amount % denominator * percent / denominator)
}
