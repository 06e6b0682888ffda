//! Purchase pricing calculations
//!
//! Tokens for a payment of `paid` native base units are
//! `paid * eth_price * usdt_price`, exact integer math with overflow checks.

use crate::error::{EconomicsError, Result};
use serde::{Deserialize, Serialize};
use xfish_core::Amount;

/// The two owner-controlled price multipliers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceParameters {
    /// Tokens per USDT
    usdt_price: u64,
    /// USDT per native unit
    eth_price: u64,
}

impl PriceParameters {
    pub fn new(usdt_price: u64, eth_price: u64) -> Result<Self> {
        if usdt_price == 0 || eth_price == 0 {
            return Err(EconomicsError::InvalidPrice {
                usdt_price,
                eth_price,
            });
        }
        Ok(Self {
            usdt_price,
            eth_price,
        })
    }

    pub fn usdt_price(&self) -> u64 {
        self.usdt_price
    }

    pub fn eth_price(&self) -> u64 {
        self.eth_price
    }
}

/// Result of pricing one payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchasePrice {
    pub paid_amount: Amount,
    pub token_amount: Amount,
    pub usdt_price: u64,
    pub eth_price: u64,
}

pub struct PriceCalculator;

impl PriceCalculator {
    pub fn calculate_token_amount(paid_amount: Amount, prices: &PriceParameters) -> Result<Amount> {
        paid_amount
            .checked_mul(Amount::from(prices.eth_price))
            .and_then(|v| v.checked_mul(Amount::from(prices.usdt_price)))
            .ok_or(EconomicsError::ArithmeticOverflow)
    }

    pub fn calculate_purchase_price(
        paid_amount: Amount,
        prices: &PriceParameters,
    ) -> Result<PurchasePrice> {
        let token_amount = Self::calculate_token_amount(paid_amount, prices)?;
        log::debug!(
            "priced payment {} at {}x{} -> {} tokens",
            paid_amount,
            prices.eth_price,
            prices.usdt_price,
            token_amount
        );

        Ok(PurchasePrice {
            paid_amount,
            token_amount,
            usdt_price: prices.usdt_price,
            eth_price: prices.eth_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfish_core::constants::UNIT;

    fn amt(n: u64) -> Amount {
        Amount::from(n)
    }

    fn pow10(exp: usize) -> Amount {
        format!("1{}", "0".repeat(exp)).parse().unwrap()
    }

    #[test]
    fn test_zero_prices_rejected() {
        assert!(PriceParameters::new(0, 2_500).is_err());
        assert!(PriceParameters::new(10_000, 0).is_err());
        assert!(PriceParameters::new(0, 0).is_err());
        assert!(PriceParameters::new(1, 1).is_ok());
    }

    #[test]
    fn test_one_native_unit() {
        let prices = PriceParameters::new(10_000, 2_500).unwrap();
        let tokens = PriceCalculator::calculate_token_amount(UNIT, &prices).unwrap();
        assert_eq!(tokens, UNIT * amt(2_500) * amt(10_000));
    }

    #[test]
    fn test_linear_in_paid_amount() {
        let prices = PriceParameters::new(20_000, 3_000).unwrap();
        let one = PriceCalculator::calculate_token_amount(UNIT / amt(10), &prices).unwrap();
        let three =
            PriceCalculator::calculate_token_amount(amt(3) * UNIT / amt(10), &prices).unwrap();
        assert_eq!(three, amt(3) * one);
        assert_eq!(
            PriceCalculator::calculate_token_amount(Amount::ZERO, &prices).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn test_products_past_u128_are_exact() {
        // 10^30 * 10^6 * 10^6 = 10^42, well past u128::MAX (~3.4 * 10^38)
        let prices = PriceParameters::new(1_000_000, 1_000_000).unwrap();
        let tokens = PriceCalculator::calculate_token_amount(pow10(30), &prices).unwrap();
        assert_eq!(tokens, pow10(42));
        assert!(tokens > Amount::from(u128::MAX));
    }

    #[test]
    fn test_overflow_detected() {
        let prices = PriceParameters::new(u64::MAX, u64::MAX).unwrap();
        assert_eq!(
            PriceCalculator::calculate_token_amount(Amount::MAX / amt(2), &prices),
            Err(EconomicsError::ArithmeticOverflow)
        );

        // (2^64 - 1)^2 < 2^128, so any paid amount below 2^128 still fits
        let below = Amount::from(u128::MAX);
        assert!(PriceCalculator::calculate_token_amount(below, &prices).is_ok());
        let above = Amount::MAX / Amount::from(u64::MAX);
        assert!(PriceCalculator::calculate_token_amount(above, &prices).is_err());
    }
}
