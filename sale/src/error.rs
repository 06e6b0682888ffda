//! Sale error types
//!
//! Every failure aborts the whole operation; callers branch on the variant.

use thiserror::Error;
use xfish_core::{Address, Amount, Asset};
use xfish_economics::EconomicsError;
use xfish_treasury::TreasuryError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    // Authorization
    #[error("Unauthorized account: {caller}")]
    Unauthorized { caller: Address },

    // Lifecycle
    #[error("Sale already active")]
    AlreadyActive,

    #[error("Sale is not active")]
    NotActive,

    #[error("Sale not active")]
    SaleNotActive,

    #[error("Enforced pause")]
    Paused,

    // Validation
    #[error("Invalid price: usdt_price={usdt_price}, eth_price={eth_price}")]
    InvalidPrice { usdt_price: u64, eth_price: u64 },

    #[error("Invalid token address")]
    InvalidTokenAddress,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),

    #[error("Purchase must yield a non-zero amount")]
    ZeroPurchase,

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Nothing to claim for {buyer}")]
    NothingToClaim { buyer: Address },

    #[error("Use buyTokens function")]
    DirectTransferNotAllowed,

    #[error("Participant index {index} out of bounds ({count} participants)")]
    ParticipantIndexOutOfBounds { index: usize, count: usize },

    #[error("Inconsistent sale state: {0}")]
    InvalidState(String),

    // Capacity
    #[error("Insufficient contract balance: {requested} {asset} requested, {available} available")]
    InsufficientContractBalance {
        asset: Asset,
        requested: Amount,
        available: Amount,
    },

    // Arithmetic
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Reentrant call")]
    ReentrantCall,
}

/// Error taxonomy used for reporting and caller branching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Lifecycle,
    Validation,
    Capacity,
    Arithmetic,
    Reentrancy,
}

impl SaleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaleError::Unauthorized { .. } => ErrorKind::Authorization,
            SaleError::AlreadyActive
            | SaleError::NotActive
            | SaleError::SaleNotActive
            | SaleError::Paused => ErrorKind::Lifecycle,
            SaleError::InvalidPrice { .. }
            | SaleError::InvalidTokenAddress
            | SaleError::InvalidRecipient(_)
            | SaleError::ZeroPurchase
            | SaleError::ZeroAmount
            | SaleError::NothingToClaim { .. }
            | SaleError::DirectTransferNotAllowed
            | SaleError::ParticipantIndexOutOfBounds { .. }
            | SaleError::InvalidState(_) => ErrorKind::Validation,
            SaleError::InsufficientContractBalance { .. } => ErrorKind::Capacity,
            SaleError::ArithmeticOverflow => ErrorKind::Arithmetic,
            SaleError::ReentrantCall => ErrorKind::Reentrancy,
        }
    }
}

impl From<EconomicsError> for SaleError {
    fn from(err: EconomicsError) -> Self {
        match err {
            EconomicsError::InvalidPrice {
                usdt_price,
                eth_price,
            } => SaleError::InvalidPrice {
                usdt_price,
                eth_price,
            },
            EconomicsError::ArithmeticOverflow => SaleError::ArithmeticOverflow,
        }
    }
}

impl From<TreasuryError> for SaleError {
    fn from(err: TreasuryError) -> Self {
        match err {
            TreasuryError::InsufficientBalance {
                asset,
                requested,
                available,
            } => SaleError::InsufficientContractBalance {
                asset,
                requested,
                available,
            },
            TreasuryError::InvalidAmount(_) => SaleError::ZeroAmount,
            TreasuryError::InvalidRecipient(addr) => SaleError::InvalidRecipient(addr),
            TreasuryError::Overflow => SaleError::ArithmeticOverflow,
        }
    }
}

pub type Result<T> = std::result::Result<T, SaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treasury_capacity_maps_to_contract_balance() {
        let err: SaleError = TreasuryError::InsufficientBalance {
            asset: Asset::Token,
            requested: Amount::from(10u64),
            available: Amount::from(5u64),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(
            err,
            SaleError::InsufficientContractBalance {
                asset: Asset::Token,
                requested: Amount::from(10u64),
                available: Amount::from(5u64),
            }
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SaleError::Unauthorized { caller: Address::ZERO }.kind(),
            ErrorKind::Authorization
        );
        assert_eq!(SaleError::Paused.kind(), ErrorKind::Lifecycle);
        assert_eq!(SaleError::ZeroPurchase.kind(), ErrorKind::Validation);
        assert_eq!(
            SaleError::InvalidState("claimed exceeds total".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            SaleError::from(EconomicsError::ArithmeticOverflow).kind(),
            ErrorKind::Arithmetic
        );
    }
}
