//! Decimal unit conversion
//!
//! Converts between human-readable decimal strings ("0.1") and base units
//! without going through floating point.

use crate::error::{CoreError, Result};
use crate::Amount;

/// 10^exp, or `None` past 2^256.
fn ten_pow(exp: u32) -> Option<Amount> {
    let ten = Amount::from(10u64);
    (0..exp).try_fold(Amount::from(1u64), |acc, _| acc.checked_mul(ten))
}

fn parse_digits(digits: &str) -> Result<Amount> {
    if digits.is_empty() {
        return Ok(Amount::ZERO);
    }
    digits.parse::<Amount>().map_err(|_| CoreError::Overflow)
}

/// Parse a decimal string into base units with `decimals` fractional digits.
pub fn parse_units(value: &str, decimals: u32) -> Result<Amount> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::InvalidAmount("empty amount".to_string()));
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(CoreError::InvalidAmount(value.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(CoreError::InvalidAmount(value.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(CoreError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            value, decimals
        )));
    }

    let scale = ten_pow(decimals).ok_or(CoreError::Overflow)?;
    let padding = ten_pow(decimals - fraction.len() as u32).ok_or(CoreError::Overflow)?;
    let whole_units = parse_digits(whole)?;
    let fraction_units = parse_digits(fraction)?
        .checked_mul(padding)
        .ok_or(CoreError::Overflow)?;

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or(CoreError::Overflow)
}

/// Render base units as a decimal string, trimming trailing zeros.
pub fn format_units(amount: Amount, decimals: u32) -> String {
    let Some(scale) = ten_pow(decimals) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let fraction = amount % scale;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
