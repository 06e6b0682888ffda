//! Vesting ledger
//!
//! One [`VestingRecord`] per distinct buyer, created on the first purchase and
//! never removed. The vesting clock is anchored at that first purchase: later
//! purchases grow `total_amount` and are folded into the same schedule, and
//! only the first purchase releases an immediate tranche at purchase time.

use crate::error::{Result, SaleError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use xfish_core::{Address, Amount, Timestamp};
use xfish_economics::{NextRelease, VestingSchedule};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VestingRecord {
    pub total_amount: Amount,
    /// Invariant: `claimed_amount <= total_amount`
    pub claimed_amount: Amount,
    pub purchase_time: Timestamp,
}

impl VestingRecord {
    pub fn unlocked_at(&self, now: Timestamp) -> Amount {
        VestingSchedule::unlocked_amount(self.total_amount, self.purchase_time, now)
    }

    pub fn claimable_at(&self, now: Timestamp) -> Amount {
        VestingSchedule::claimable_amount(
            self.total_amount,
            self.claimed_amount,
            self.purchase_time,
            now,
        )
    }

    /// Entitlement not yet delivered
    pub fn remaining(&self) -> Amount {
        self.total_amount.saturating_sub(self.claimed_amount)
    }
}

/// Snapshot of one buyer's position at a point in time
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VestingDetails {
    pub total: Amount,
    pub claimed: Amount,
    pub claimable: Amount,
    /// Not yet unlocked
    pub locked: Amount,
}

/// Buyers in first-purchase order, each exactly once
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantIndex {
    participants: Vec<Address>,
}

impl ParticipantIndex {
    fn append(&mut self, buyer: Address) {
        self.participants.push(buyer);
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        self.participants.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.participants
    }
}

/// What a recorded purchase did to the buyer's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub first_purchase: bool,
    /// Tokens to deliver right now (zero for top-ups)
    pub immediate_unlock: Amount,
    pub total_amount: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VestingLedger {
    records: BTreeMap<Address, VestingRecord>,
    participants: ParticipantIndex,
}

impl VestingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, buyer: &Address) -> Option<&VestingRecord> {
        self.records.get(buyer)
    }

    pub fn has_participated(&self, buyer: &Address) -> bool {
        self.records.contains_key(buyer)
    }

    pub fn participants(&self) -> &ParticipantIndex {
        &self.participants
    }

    /// Create or grow the buyer's record. Fails before mutating anything.
    pub fn record_purchase(
        &mut self,
        buyer: Address,
        token_amount: Amount,
        now: Timestamp,
    ) -> Result<PurchaseReceipt> {
        if token_amount.is_zero() {
            return Err(SaleError::ZeroPurchase);
        }

        if let Some(record) = self.records.get_mut(&buyer) {
            let total = record
                .total_amount
                .checked_add(token_amount)
                .ok_or(SaleError::ArithmeticOverflow)?;
            record.total_amount = total;

            return Ok(PurchaseReceipt {
                first_purchase: false,
                immediate_unlock: Amount::ZERO,
                total_amount: total,
            });
        }

        let immediate = VestingSchedule::immediate_unlock(token_amount);
        self.records.insert(
            buyer,
            VestingRecord {
                total_amount: token_amount,
                claimed_amount: immediate,
                purchase_time: now,
            },
        );
        self.participants.append(buyer);

        Ok(PurchaseReceipt {
            first_purchase: true,
            immediate_unlock: immediate,
            total_amount: token_amount,
        })
    }

    pub fn claimable_amount(&self, buyer: &Address, now: Timestamp) -> Amount {
        self.records
            .get(buyer)
            .map(|r| r.claimable_at(now))
            .unwrap_or_default()
    }

    /// Mark `amount` as delivered to `buyer`
    pub fn apply_claim(&mut self, buyer: &Address, amount: Amount) -> Result<()> {
        let record = self
            .records
            .get_mut(buyer)
            .ok_or(SaleError::NothingToClaim { buyer: *buyer })?;

        let claimed = record
            .claimed_amount
            .checked_add(amount)
            .filter(|claimed| *claimed <= record.total_amount)
            .ok_or(SaleError::ArithmeticOverflow)?;
        record.claimed_amount = claimed;
        Ok(())
    }

    pub fn vesting_details(&self, buyer: &Address, now: Timestamp) -> VestingDetails {
        match self.records.get(buyer) {
            Some(record) => {
                let unlocked = record.unlocked_at(now);
                VestingDetails {
                    total: record.total_amount,
                    claimed: record.claimed_amount,
                    claimable: unlocked.saturating_sub(record.claimed_amount),
                    locked: record
                        .total_amount
                        .saturating_sub(unlocked.max(record.claimed_amount)),
                }
            }
            None => VestingDetails::default(),
        }
    }

    pub fn next_release(&self, buyer: &Address, now: Timestamp) -> Option<NextRelease> {
        self.records.get(buyer).and_then(|record| {
            VestingSchedule::next_release(record.total_amount, record.purchase_time, now)
        })
    }

    /// Tokens owed to all buyers and not yet delivered
    pub fn total_outstanding(&self) -> Amount {
        self.records
            .values()
            .fold(Amount::ZERO, |acc, r| acc.saturating_add(r.remaining()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &VestingRecord)> {
        self.records.iter()
    }

    /// Check the invariants a freshly loaded ledger must satisfy
    pub fn validate(&self) -> Result<()> {
        for (buyer, record) in self.iter() {
            if record.claimed_amount > record.total_amount {
                return Err(SaleError::InvalidState(format!(
                    "{} claimed {} of a {} total",
                    buyer, record.claimed_amount, record.total_amount
                )));
            }
            if record.total_amount.is_zero() {
                return Err(SaleError::InvalidState(format!("{} has an empty record", buyer)));
            }
        }

        let participants = self.participants.as_slice();
        if participants.len() != self.records.len() {
            return Err(SaleError::InvalidState(format!(
                "{} participants for {} records",
                participants.len(),
                self.records.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for buyer in participants {
            if !self.records.contains_key(buyer) || !seen.insert(*buyer) {
                return Err(SaleError::InvalidState(format!(
                    "participant {} does not match a single record",
                    buyer
                )));
            }
        }
        Ok(())
    }
}
