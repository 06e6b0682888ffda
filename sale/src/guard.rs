//! Reentrancy guard
//!
//! Operations that move value hold a [`GuardToken`] for their whole duration.
//! A second `enter` while a token is alive fails with `ReentrantCall`. The
//! token releases the guard on drop, including on early `?` returns.

use crate::error::{Result, SaleError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Result<GuardToken> {
        if self.entered.swap(true, Ordering::AcqRel) {
            return Err(SaleError::ReentrantCall);
        }
        Ok(GuardToken {
            entered: Arc::clone(&self.entered),
        })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken {
    entered: Arc<AtomicBool>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.entered.store(false, Ordering::Release);
    }
}
