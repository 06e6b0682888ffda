//! Economics error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomicsError {
    #[error("Invalid price: usdt_price={usdt_price}, eth_price={eth_price} (both must be > 0)")]
    InvalidPrice { usdt_price: u64, eth_price: u64 },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T> = std::result::Result<T, EconomicsError>;
