//! Sale lifecycle and ownership gating

use crate::error::{Result, SaleError};
use serde::{Deserialize, Serialize};
use xfish_core::Address;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleState {
    pub active: bool,
    pub paused: bool,
    pub owner: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleController {
    state: SaleState,
}

impl SaleController {
    pub fn new(owner: Address) -> Result<Self> {
        if owner.is_zero() {
            return Err(SaleError::InvalidRecipient(owner));
        }
        Ok(Self {
            state: SaleState {
                active: false,
                paused: false,
                owner,
            },
        })
    }

    pub fn owner(&self) -> Address {
        self.state.owner
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Single authorization check shared by every owner-only operation
    pub fn only_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.state.owner {
            log::warn!("rejected owner-only call from {}", caller);
            return Err(SaleError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Purchases need a running, unpaused sale. The pause is reported first.
    pub fn require_active(&self) -> Result<()> {
        self.require_not_paused()?;
        if !self.state.active {
            return Err(SaleError::SaleNotActive);
        }
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        if self.state.paused {
            return Err(SaleError::Paused);
        }
        Ok(())
    }

    pub fn start_sale(&mut self, caller: &Address) -> Result<()> {
        self.only_owner(caller)?;
        if self.state.active {
            return Err(SaleError::AlreadyActive);
        }
        self.state.active = true;
        Ok(())
    }

    pub fn end_sale(&mut self, caller: &Address) -> Result<()> {
        self.only_owner(caller)?;
        if !self.state.active {
            return Err(SaleError::NotActive);
        }
        self.state.active = false;
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.only_owner(caller)?;
        self.state.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.only_owner(caller)?;
        self.state.paused = false;
        Ok(())
    }

    /// Hand ownership to `new_owner`, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<Address> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(SaleError::InvalidRecipient(new_owner));
        }
        let previous = self.state.owner;
        self.state.owner = new_owner;
        Ok(previous)
    }
}
