//! Treasury error types

use thiserror::Error;
use xfish_core::{Address, Amount, Asset};

/// Treasury pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Insufficient {asset} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        requested: Amount,
        available: Amount,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),

    #[error("Treasury balance overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
