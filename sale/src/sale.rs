//! The token sale service
//!
//! Each public operation is one atomic transition: every check that can fail
//! runs before the first mutation, internal accounting is updated before
//! value leaves the treasury, and value-moving operations hold the
//! reentrancy guard for their whole duration.

use crate::controller::SaleController;
use crate::error::{Result, SaleError};
use crate::events::SaleEvent;
use crate::guard::ReentrancyGuard;
use crate::ledger::{ParticipantIndex, VestingDetails, VestingLedger, VestingRecord};
use serde::{Deserialize, Serialize};
use xfish_core::{Address, Amount, Asset, Timestamp};
use xfish_economics::{NextRelease, PriceCalculator, PriceParameters, SaleStats, SalesTracker};
use xfish_treasury::{TreasuryPool, TreasurySource, WithdrawalReason};

/// Construction parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleConfig {
    pub owner: Address,
    /// Identity of the token being sold
    pub token: Address,
    /// Tokens per USDT
    pub usdt_price: u64,
    /// USDT per native unit
    pub eth_price: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenSale {
    token: Address,
    controller: SaleController,
    prices: PriceParameters,
    ledger: VestingLedger,
    treasury: TreasuryPool,
    tracker: SalesTracker,
    events: Vec<SaleEvent>,
    #[serde(skip)]
    guard: ReentrancyGuard,
}

impl TokenSale {
    pub fn new(config: SaleConfig) -> Result<Self> {
        if config.token.is_zero() {
            return Err(SaleError::InvalidTokenAddress);
        }
        let prices = PriceParameters::new(config.usdt_price, config.eth_price)?;
        let controller = SaleController::new(config.owner)?;

        log::info!(
            "token sale created for token {} (owner {}, usdt_price {}, eth_price {})",
            config.token,
            config.owner,
            config.usdt_price,
            config.eth_price
        );

        Ok(Self {
            token: config.token,
            controller,
            prices,
            ledger: VestingLedger::new(),
            treasury: TreasuryPool::new(),
            tracker: SalesTracker::new(),
            events: Vec::new(),
            guard: ReentrancyGuard::new(),
        })
    }

    // ---------------------------------------------------------------
    // Admin / lifecycle
    // ---------------------------------------------------------------

    pub fn start_sale(&mut self, caller: &Address) -> Result<()> {
        self.controller.start_sale(caller)?;
        self.emit(SaleEvent::SaleStarted);
        Ok(())
    }

    pub fn end_sale(&mut self, caller: &Address) -> Result<()> {
        self.controller.end_sale(caller)?;
        self.emit(SaleEvent::SaleEnded);
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.controller.pause(caller)?;
        self.emit(SaleEvent::Paused { account: *caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.controller.unpause(caller)?;
        self.emit(SaleEvent::Unpaused { account: *caller });
        Ok(())
    }

    /// Replace both prices at once. Existing entitlements are not repriced.
    pub fn update_prices(
        &mut self,
        caller: &Address,
        usdt_price: u64,
        eth_price: u64,
    ) -> Result<()> {
        self.controller.only_owner(caller)?;
        let prices = PriceParameters::new(usdt_price, eth_price)?;
        let old = std::mem::replace(&mut self.prices, prices);

        self.emit(SaleEvent::PricesUpdated {
            old_usdt_price: old.usdt_price(),
            old_eth_price: old.eth_price(),
            usdt_price,
            eth_price,
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        let previous_owner = self.controller.transfer_ownership(caller, new_owner)?;
        self.emit(SaleEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Buyer-facing
    // ---------------------------------------------------------------

    /// Pay `paid_amount` native base units for a vesting token entitlement.
    /// Returns the token amount purchased.
    pub fn buy_tokens(
        &mut self,
        buyer: &Address,
        paid_amount: Amount,
        now: Timestamp,
    ) -> Result<Amount> {
        let _guard = self.guard.enter()?;
        self.controller.require_active()?;

        if buyer.is_zero() {
            return Err(SaleError::InvalidRecipient(*buyer));
        }
        if paid_amount.is_zero() {
            return Err(SaleError::ZeroPurchase);
        }

        let token_amount =
            PriceCalculator::calculate_purchase_price(paid_amount, &self.prices)?.token_amount;
        if token_amount.is_zero() {
            return Err(SaleError::ZeroPurchase);
        }
        // Checked against live holdings only; obligations to other buyers are not reserved
        self.treasury
            .ensure_available(Asset::Token, token_amount)
            .inspect_err(|e| log::warn!("purchase by {} rejected: {}", buyer, e))?;
        self.treasury.ensure_can_deposit(Asset::Native, paid_amount)?;

        // Buyer totals never exceed the sale totals, so once the tracker
        // accepts the purchase the ledger cannot overflow
        self.tracker.record_purchase(paid_amount, token_amount)?;
        let receipt = self.ledger.record_purchase(*buyer, token_amount, now)?;
        if !receipt.immediate_unlock.is_zero() {
            self.tracker.record_release(receipt.immediate_unlock)?;
        }

        self.treasury.deposit(
            Asset::Native,
            paid_amount,
            TreasurySource::Purchase { buyer: *buyer },
            now,
        )?;
        if !receipt.immediate_unlock.is_zero() {
            self.treasury.withdraw(
                Asset::Token,
                *buyer,
                receipt.immediate_unlock,
                WithdrawalReason::ImmediateUnlock,
                now,
            )?;
        }

        log::debug!(
            "{} purchase by {}: total entitlement {}, released now {}",
            if receipt.first_purchase { "first" } else { "top-up" },
            buyer,
            receipt.total_amount,
            receipt.immediate_unlock
        );
        self.emit(SaleEvent::TokensPurchased {
            buyer: *buyer,
            paid_amount,
            token_amount,
        });
        Ok(token_amount)
    }

    /// Deliver everything unlocked but not yet claimed. Works whether or not
    /// the sale is active, but not while paused.
    pub fn claim_tokens(&mut self, buyer: &Address, now: Timestamp) -> Result<Amount> {
        let _guard = self.guard.enter()?;
        self.controller.require_not_paused()?;

        let amount = self.ledger.claimable_amount(buyer, now);
        if amount.is_zero() {
            return Err(SaleError::NothingToClaim { buyer: *buyer });
        }
        self.treasury.ensure_available(Asset::Token, amount)?;

        self.ledger.apply_claim(buyer, amount)?;
        self.tracker.record_release(amount)?;
        self.treasury
            .withdraw(Asset::Token, *buyer, amount, WithdrawalReason::VestingClaim, now)?;

        self.emit(SaleEvent::TokensClaimed {
            buyer: *buyer,
            amount,
        });
        Ok(amount)
    }

    /// Native currency sent outside of `buy_tokens` is refused
    pub fn receive_native(&mut self, sender: &Address, amount: Amount) -> Result<()> {
        log::warn!("refused direct transfer of {} from {}", amount, sender);
        Err(SaleError::DirectTransferNotAllowed)
    }

    // ---------------------------------------------------------------
    // Treasury
    // ---------------------------------------------------------------

    /// Put sale tokens into custody
    pub fn fund_tokens(&mut self, from: &Address, amount: Amount, now: Timestamp) -> Result<()> {
        let _guard = self.guard.enter()?;
        if amount.is_zero() {
            return Err(SaleError::ZeroAmount);
        }

        self.treasury.deposit(
            Asset::Token,
            amount,
            TreasurySource::Funding { from: *from },
            now,
        )?;
        self.emit(SaleEvent::TokensFunded {
            from: *from,
            amount,
        });
        Ok(())
    }

    /// Sweep all native currency to the owner. Returns the amount moved.
    pub fn withdraw_eth(&mut self, caller: &Address, now: Timestamp) -> Result<Amount> {
        let _guard = self.guard.enter()?;
        self.controller.only_owner(caller)?;

        let amount = self.treasury.balance(Asset::Native);
        if amount.is_zero() {
            return Err(SaleError::ZeroAmount);
        }

        let owner = self.controller.owner();
        self.treasury
            .withdraw(Asset::Native, owner, amount, WithdrawalReason::OwnerWithdrawal, now)?;
        self.emit(SaleEvent::NativeWithdrawn { to: owner, amount });
        Ok(amount)
    }

    /// Recovery path: move any amount of either asset to the owner, ignoring
    /// vesting obligations entirely
    pub fn emergency_withdraw(
        &mut self,
        caller: &Address,
        asset: Asset,
        amount: Amount,
        now: Timestamp,
    ) -> Result<()> {
        let _guard = self.guard.enter()?;
        self.controller.only_owner(caller)?;
        if amount.is_zero() {
            return Err(SaleError::ZeroAmount);
        }

        let owner = self.controller.owner();
        self.treasury
            .withdraw(asset, owner, amount, WithdrawalReason::EmergencyWithdrawal, now)?;

        let left = self.treasury.balance(Asset::Token);
        let owed = self.ledger.total_outstanding();
        if asset == Asset::Token && left < owed {
            log::warn!(
                "emergency withdrawal left {} tokens against {} owed to buyers",
                left,
                owed
            );
        }
        self.emit(SaleEvent::EmergencyWithdraw { asset, amount });
        Ok(())
    }

    /// Direct, non-vesting token grant
    pub fn transfer_referral_bonus(
        &mut self,
        caller: &Address,
        recipient: &Address,
        amount: Amount,
        reason: &str,
        now: Timestamp,
    ) -> Result<()> {
        let _guard = self.guard.enter()?;
        self.controller.only_owner(caller)?;

        if recipient.is_zero() {
            return Err(SaleError::InvalidRecipient(*recipient));
        }
        if amount.is_zero() {
            return Err(SaleError::ZeroAmount);
        }
        self.treasury.ensure_available(Asset::Token, amount)?;

        self.tracker.record_referral_bonus(amount)?;
        self.treasury.withdraw(
            Asset::Token,
            *recipient,
            amount,
            WithdrawalReason::ReferralBonus {
                reason: reason.to_string(),
            },
            now,
        )?;

        self.emit(SaleEvent::ReferralBonusTransferred {
            recipient: *recipient,
            amount,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Check a deserialized sale before any operation runs against it
    pub fn validate(&self) -> Result<()> {
        if self.token.is_zero() {
            return Err(SaleError::InvalidTokenAddress);
        }
        if self.controller.owner().is_zero() {
            return Err(SaleError::InvalidRecipient(self.controller.owner()));
        }
        PriceParameters::new(self.prices.usdt_price(), self.prices.eth_price())?;
        self.ledger.validate()?;

        let owed = self
            .ledger
            .iter()
            .try_fold(Amount::ZERO, |acc, (_, r)| acc.checked_add(r.total_amount))
            .ok_or(SaleError::ArithmeticOverflow)?;
        let sold = self.tracker.stats().total_tokens_sold;
        if owed != sold {
            return Err(SaleError::InvalidState(format!(
                "ledger entitlements {} do not match {} tokens sold",
                owed, sold
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn owner(&self) -> Address {
        self.controller.owner()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.controller.is_paused()
    }

    pub fn prices(&self) -> PriceParameters {
        self.prices
    }

    pub fn usdt_price(&self) -> u64 {
        self.prices.usdt_price()
    }

    pub fn eth_price(&self) -> u64 {
        self.prices.eth_price()
    }

    pub fn calculate_token_amount(&self, paid_amount: Amount) -> Result<Amount> {
        Ok(PriceCalculator::calculate_token_amount(paid_amount, &self.prices)?)
    }

    pub fn vesting_info(&self, buyer: &Address) -> Option<&VestingRecord> {
        self.ledger.record(buyer)
    }

    pub fn vesting_details(&self, buyer: &Address, now: Timestamp) -> VestingDetails {
        self.ledger.vesting_details(buyer, now)
    }

    pub fn claimable_amount(&self, buyer: &Address, now: Timestamp) -> Amount {
        self.ledger.claimable_amount(buyer, now)
    }

    /// Next unlock boundary; zeroed once fully vested or for non-buyers
    pub fn next_release_info(&self, buyer: &Address, now: Timestamp) -> NextRelease {
        self.ledger.next_release(buyer, now).unwrap_or_default()
    }

    pub fn participant_count(&self) -> usize {
        self.ledger.participants().len()
    }

    pub fn participant(&self, index: usize) -> Result<Address> {
        let participants = self.ledger.participants();
        participants
            .get(index)
            .ok_or(SaleError::ParticipantIndexOutOfBounds {
                index,
                count: participants.len(),
            })
    }

    pub fn participants(&self) -> &ParticipantIndex {
        self.ledger.participants()
    }

    pub fn has_participated(&self, buyer: &Address) -> bool {
        self.ledger.has_participated(buyer)
    }

    pub fn contract_token_balance(&self) -> Amount {
        self.treasury.balance(Asset::Token)
    }

    pub fn contract_native_balance(&self) -> Amount {
        self.treasury.balance(Asset::Native)
    }

    /// Whether `amount` tokens could leave custody right now
    pub fn has_sufficient_balance(&self, amount: Amount) -> bool {
        self.treasury.has_sufficient(Asset::Token, amount)
    }

    pub fn total_native_raised(&self) -> Amount {
        self.tracker.stats().total_native_raised
    }

    pub fn total_tokens_sold(&self) -> Amount {
        self.tracker.stats().total_tokens_sold
    }

    pub fn stats(&self) -> &SaleStats {
        self.tracker.stats()
    }

    /// Tokens owed to buyers and not yet delivered
    pub fn outstanding_obligations(&self) -> Amount {
        self.ledger.total_outstanding()
    }

    pub fn ledger(&self) -> &VestingLedger {
        &self.ledger
    }

    pub fn treasury(&self) -> &TreasuryPool {
        &self.treasury
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    /// Drain the event log
    pub fn take_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SaleEvent) {
        log::info!("{}", event);
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfish_core::constants::{MONTH_DURATION, UNIT};

    const T0: Timestamp = 1_700_000_000;

    fn amt(n: u64) -> Amount {
        Amount::from(n)
    }

    fn owner() -> Address {
        Address::repeat_byte(0x01)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn funded_sale() -> TokenSale {
        let mut sale = TokenSale::new(SaleConfig {
            owner: owner(),
            token: Address::repeat_byte(0x7f),
            usdt_price: 10_000,
            eth_price: 2_500,
        })
        .unwrap();
        sale.fund_tokens(&owner(), amt(100_000_000) * UNIT, T0).unwrap();
        sale.start_sale(&owner()).unwrap();
        sale
    }

    #[test]
    fn test_reentrant_purchase_rejected() {
        let mut sale = funded_sale();
        let token = sale.guard.enter().unwrap();

        assert_eq!(
            sale.buy_tokens(&alice(), UNIT / amt(10), T0),
            Err(SaleError::ReentrantCall)
        );
        assert_eq!(sale.claim_tokens(&alice(), T0), Err(SaleError::ReentrantCall));
        assert_eq!(sale.withdraw_eth(&owner(), T0), Err(SaleError::ReentrantCall));
        assert!(!sale.has_participated(&alice()));

        drop(token);
        assert!(sale.buy_tokens(&alice(), UNIT / amt(10), T0).is_ok());
    }

    #[test]
    fn test_guard_released_after_failure() {
        let mut sale = funded_sale();
        assert!(sale.buy_tokens(&alice(), Amount::ZERO, T0).is_err());
        assert!(!sale.guard.is_entered());
        assert!(sale.buy_tokens(&alice(), UNIT / amt(10), T0).is_ok());
    }

    #[test]
    fn test_claim_checks_custody_after_emergency_drain() {
        let mut sale = funded_sale();
        sale.buy_tokens(&alice(), UNIT / amt(10), T0).unwrap();

        let balance = sale.contract_token_balance();
        sale.emergency_withdraw(&owner(), Asset::Token, balance, T0).unwrap();

        let before = *sale.vesting_info(&alice()).unwrap();
        let err = sale.claim_tokens(&alice(), T0 + MONTH_DURATION).unwrap_err();
        assert!(matches!(err, SaleError::InsufficientContractBalance { .. }));
        assert_eq!(*sale.vesting_info(&alice()).unwrap(), before);
    }

    #[test]
    fn test_events_are_recorded_in_order() {
        let mut sale = funded_sale();
        sale.buy_tokens(&alice(), UNIT, T0).unwrap();

        let events = sale.take_events();
        assert_eq!(
            events,
            vec![
                SaleEvent::TokensFunded {
                    from: owner(),
                    amount: amt(100_000_000) * UNIT
                },
                SaleEvent::SaleStarted,
                SaleEvent::TokensPurchased {
                    buyer: alice(),
                    paid_amount: UNIT,
                    token_amount: UNIT * amt(2_500) * amt(10_000),
                },
            ]
        );
        assert!(sale.events().is_empty());
    }

    #[test]
    fn test_validate_accepts_live_sale() {
        let mut sale = funded_sale();
        sale.buy_tokens(&alice(), UNIT / amt(10), T0).unwrap();
        sale.buy_tokens(&alice(), UNIT / amt(10), T0 + 5).unwrap();
        sale.claim_tokens(&alice(), T0 + MONTH_DURATION).unwrap();
        assert!(sale.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overclaimed_snapshot() {
        let mut sale = funded_sale();
        sale.buy_tokens(&alice(), UNIT / amt(10), T0).unwrap();

        let mut value = serde_json::to_value(&sale).unwrap();
        let total = value["ledger"]["records"][alice().to_string()]["total_amount"].clone();
        let doubled = serde_json::from_value::<Amount>(total).unwrap() * amt(2);
        value["ledger"]["records"][alice().to_string()]["claimed_amount"] =
            serde_json::to_value(doubled).unwrap();

        let corrupted: TokenSale = serde_json::from_value(value).unwrap();
        assert!(matches!(corrupted.validate(), Err(SaleError::InvalidState(_))));

        // Views stay total on the bad record
        let record = corrupted.vesting_info(&alice()).unwrap();
        assert_eq!(record.remaining(), Amount::ZERO);
        assert_eq!(
            corrupted.vesting_details(&alice(), T0).locked,
            Amount::ZERO
        );
        assert_eq!(corrupted.claimable_amount(&alice(), T0), Amount::ZERO);
        assert_eq!(corrupted.outstanding_obligations(), Amount::ZERO);
    }

    #[test]
    fn test_validate_rejects_sold_mismatch() {
        let mut sale = funded_sale();
        sale.buy_tokens(&alice(), UNIT / amt(10), T0).unwrap();

        let mut value = serde_json::to_value(&sale).unwrap();
        value["tracker"]["stats"]["total_tokens_sold"] = serde_json::to_value(amt(1)).unwrap();

        let corrupted: TokenSale = serde_json::from_value(value).unwrap();
        assert!(matches!(corrupted.validate(), Err(SaleError::InvalidState(_))));
    }
}
