//! Signals emitted by sale operations

use serde::{Deserialize, Serialize};
use std::fmt;
use xfish_core::{Address, Amount, Asset};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SaleEvent {
    SaleStarted,
    SaleEnded,
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    PricesUpdated {
        old_usdt_price: u64,
        old_eth_price: u64,
        usdt_price: u64,
        eth_price: u64,
    },
    TokensPurchased {
        buyer: Address,
        paid_amount: Amount,
        token_amount: Amount,
    },
    TokensClaimed {
        buyer: Address,
        amount: Amount,
    },
    ReferralBonusTransferred {
        recipient: Address,
        amount: Amount,
        reason: String,
    },
    EmergencyWithdraw {
        asset: Asset,
        amount: Amount,
    },
    NativeWithdrawn {
        to: Address,
        amount: Amount,
    },
    TokensFunded {
        from: Address,
        amount: Amount,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl fmt::Display for SaleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleEvent::SaleStarted => write!(f, "SaleStarted"),
            SaleEvent::SaleEnded => write!(f, "SaleEnded"),
            SaleEvent::Paused { account } => write!(f, "Paused(by={})", account),
            SaleEvent::Unpaused { account } => write!(f, "Unpaused(by={})", account),
            SaleEvent::PricesUpdated {
                old_usdt_price,
                old_eth_price,
                usdt_price,
                eth_price,
            } => write!(
                f,
                "PricesUpdated(usdt {} -> {}, eth {} -> {})",
                old_usdt_price, usdt_price, old_eth_price, eth_price
            ),
            SaleEvent::TokensPurchased {
                buyer,
                paid_amount,
                token_amount,
            } => write!(
                f,
                "TokensPurchased(buyer={}, paid={}, tokens={})",
                buyer, paid_amount, token_amount
            ),
            SaleEvent::TokensClaimed { buyer, amount } => {
                write!(f, "TokensClaimed(buyer={}, amount={})", buyer, amount)
            }
            SaleEvent::ReferralBonusTransferred {
                recipient,
                amount,
                reason,
            } => write!(
                f,
                "ReferralBonusTransferred(recipient={}, amount={}, reason={:?})",
                recipient, amount, reason
            ),
            SaleEvent::EmergencyWithdraw { asset, amount } => {
                write!(f, "EmergencyWithdraw(asset={}, amount={})", asset, amount)
            }
            SaleEvent::NativeWithdrawn { to, amount } => {
                write!(f, "NativeWithdrawn(to={}, amount={})", to, amount)
            }
            SaleEvent::TokensFunded { from, amount } => {
                write!(f, "TokensFunded(from={}, amount={})", from, amount)
            }
            SaleEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => write!(
                f,
                "OwnershipTransferred({} -> {})",
                previous_owner, new_owner
            ),
        }
    }
}
