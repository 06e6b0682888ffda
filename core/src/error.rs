//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid address length: expected {expected} bytes, found {found}")]
    InvalidAddressLength { expected: usize, found: usize },

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, CoreError>;
