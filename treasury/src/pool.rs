//! Treasury Pool Management
//!
//! Holdings are only ever moved as whole transfers: a transfer that exceeds
//! the current holding fails without touching any balance.
//!
//! The audit trail keeps the most recent `RETAINED_TRANSACTIONS` entries.
//! Running totals in `TreasuryStats` always cover the full history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xfish_core::{Address, Amount, Asset, Timestamp};

use crate::error::{Result, TreasuryError};

/// Number of transactions included in a report
pub const REPORT_RECENT_TRANSACTIONS: usize = 10;

/// Audit trail entries kept in custody state; older entries are dropped
pub const RETAINED_TRANSACTIONS: usize = 256;

/// Per-asset amounts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holdings {
    pub native: Amount,
    pub token: Amount,
}

impl Holdings {
    pub fn get(&self, asset: Asset) -> Amount {
        match asset {
            Asset::Native => self.native,
            Asset::Token => self.token,
        }
    }

    fn get_mut(&mut self, asset: Asset) -> &mut Amount {
        match asset {
            Asset::Native => &mut self.native,
            Asset::Token => &mut self.token,
        }
    }
}

/// Where incoming funds came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TreasurySource {
    /// Native currency paid for a purchase
    Purchase { buyer: Address },
    /// Sale tokens sent into custody
    Funding { from: Address },
}

/// Why funds left custody
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WithdrawalReason {
    ImmediateUnlock,
    VestingClaim,
    ReferralBonus { reason: String },
    OwnerWithdrawal,
    EmergencyWithdrawal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreasuryWithdrawal {
    pub recipient: Address,
    pub reason: WithdrawalReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit(TreasurySource),
    Withdrawal(TreasuryWithdrawal),
}

/// Audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreasuryTransaction {
    pub id: u64,
    pub asset: Asset,
    pub amount: Amount,
    pub timestamp: Timestamp,
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreasuryStats {
    pub total_deposited: Holdings,
    pub total_withdrawn: Holdings,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryReport {
    pub generated_at: Timestamp,
    pub balances: Holdings,
    pub stats: TreasuryStats,
    pub recipient_count: usize,
    pub recent_transactions: Vec<TreasuryTransaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreasuryPool {
    balances: Holdings,
    /// Amounts transferred out, per recipient
    credited: BTreeMap<Address, Holdings>,
    /// Most recent entries only, oldest first
    transactions: Vec<TreasuryTransaction>,
    stats: TreasuryStats,
}

impl TreasuryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, asset: Asset) -> Amount {
        self.balances.get(asset)
    }

    pub fn balances(&self) -> Holdings {
        self.balances
    }

    pub fn has_sufficient(&self, asset: Asset, amount: Amount) -> bool {
        self.balance(asset) >= amount
    }

    /// Fail unless `amount` of `asset` can leave custody right now
    pub fn ensure_available(&self, asset: Asset, amount: Amount) -> Result<()> {
        let available = self.balance(asset);
        if available < amount {
            return Err(TreasuryError::InsufficientBalance {
                asset,
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Fail unless a deposit of `amount` would fit in the running totals
    pub fn ensure_can_deposit(&self, asset: Asset, amount: Amount) -> Result<()> {
        self.balance(asset)
            .checked_add(amount)
            .and(self.stats.total_deposited.get(asset).checked_add(amount))
            .map(|_| ())
            .ok_or(TreasuryError::Overflow)
    }

    /// Take funds into custody
    pub fn deposit(
        &mut self,
        asset: Asset,
        amount: Amount,
        source: TreasurySource,
        timestamp: Timestamp,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(TreasuryError::InvalidAmount(
                "Deposit amount must be greater than zero".to_string(),
            ));
        }

        let new_balance = self
            .balance(asset)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        let new_total = self
            .stats
            .total_deposited
            .get(asset)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;

        *self.balances.get_mut(asset) = new_balance;
        *self.stats.total_deposited.get_mut(asset) = new_total;
        self.record(asset, amount, timestamp, TransactionKind::Deposit(source));

        log::debug!("treasury deposit: {} {} (balance {})", amount, asset, new_balance);
        Ok(())
    }

    /// Move funds out of custody to `recipient`
    pub fn withdraw(
        &mut self,
        asset: Asset,
        recipient: Address,
        amount: Amount,
        reason: WithdrawalReason,
        timestamp: Timestamp,
    ) -> Result<()> {
        if recipient.is_zero() {
            return Err(TreasuryError::InvalidRecipient(recipient));
        }
        if amount.is_zero() {
            return Err(TreasuryError::InvalidAmount(
                "Withdrawal amount must be greater than zero".to_string(),
            ));
        }
        self.ensure_available(asset, amount)?;

        let credited = self
            .credited(&recipient, asset)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        let withdrawn = self
            .stats
            .total_withdrawn
            .get(asset)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        let remaining = self
            .balance(asset)
            .checked_sub(amount)
            .ok_or(TreasuryError::Overflow)?;

        *self.balances.get_mut(asset) = remaining;
        *self.credited.entry(recipient).or_default().get_mut(asset) = credited;
        *self.stats.total_withdrawn.get_mut(asset) = withdrawn;
        self.record(
            asset,
            amount,
            timestamp,
            TransactionKind::Withdrawal(TreasuryWithdrawal { recipient, reason }),
        );

        log::debug!(
            "treasury withdrawal: {} {} to {} (balance {})",
            amount,
            asset,
            recipient,
            self.balance(asset)
        );
        Ok(())
    }

    /// Total of `asset` this pool has transferred to `recipient`
    pub fn credited(&self, recipient: &Address, asset: Asset) -> Amount {
        self.credited
            .get(recipient)
            .map(|h| h.get(asset))
            .unwrap_or_default()
    }

    /// Retained audit trail, oldest first
    pub fn transactions(&self) -> &[TreasuryTransaction] {
        &self.transactions
    }

    pub fn stats(&self) -> &TreasuryStats {
        &self.stats
    }

    pub fn report(&self, generated_at: Timestamp) -> TreasuryReport {
        let skip = self
            .transactions
            .len()
            .saturating_sub(REPORT_RECENT_TRANSACTIONS);

        TreasuryReport {
            generated_at,
            balances: self.balances,
            stats: self.stats.clone(),
            recipient_count: self.credited.len(),
            recent_transactions: self.transactions[skip..].to_vec(),
        }
    }

    fn record(&mut self, asset: Asset, amount: Amount, timestamp: Timestamp, kind: TransactionKind) {
        let id = self.stats.transaction_count;
        self.stats.transaction_count += 1;
        self.transactions.push(TreasuryTransaction {
            id,
            asset,
            amount,
            timestamp,
            kind,
        });

        if self.transactions.len() > RETAINED_TRANSACTIONS {
            let excess = self.transactions.len() - RETAINED_TRANSACTIONS;
            self.transactions.drain(..excess);
        }
    }
}
