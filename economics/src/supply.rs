//! Aggregate sale statistics

use crate::error::{EconomicsError, Result};
use serde::{Deserialize, Serialize};
use xfish_core::Amount;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleStats {
    pub total_native_raised: Amount,
    pub total_tokens_sold: Amount,
    /// Tokens delivered to buyers, immediate unlocks and claims combined
    pub total_tokens_released: Amount,
    pub total_referral_bonus: Amount,
    pub purchase_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesTracker {
    stats: SaleStats,
}

impl SalesTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_purchase(&mut self, paid_amount: Amount, token_amount: Amount) -> Result<()> {
        let raised = checked_add(self.stats.total_native_raised, paid_amount)?;
        let sold = checked_add(self.stats.total_tokens_sold, token_amount)?;

        self.stats.total_native_raised = raised;
        self.stats.total_tokens_sold = sold;
        self.stats.purchase_count += 1;
        Ok(())
    }

    pub fn record_release(&mut self, amount: Amount) -> Result<()> {
        self.stats.total_tokens_released = checked_add(self.stats.total_tokens_released, amount)?;
        Ok(())
    }

    pub fn record_referral_bonus(&mut self, amount: Amount) -> Result<()> {
        self.stats.total_referral_bonus = checked_add(self.stats.total_referral_bonus, amount)?;
        Ok(())
    }

    pub fn stats(&self) -> &SaleStats {
        &self.stats
    }
}

fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(EconomicsError::ArithmeticOverflow)
}
