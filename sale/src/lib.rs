//! XFISH Token Sale
//!
//! Purchase-pricing and vesting-settlement state machine:
//! - [`SaleController`] gates every mutating operation (owner, active, paused)
//! - [`VestingLedger`] tracks per-buyer entitlements and the participant index
//! - [`TokenSale`] composes pricing, vesting and treasury custody into the
//!   public operations, one atomic state transition per call

pub mod controller;
pub mod error;
pub mod events;
pub mod guard;
pub mod ledger;
pub mod sale;

pub use controller::{SaleController, SaleState};
pub use error::{ErrorKind, Result, SaleError};
pub use events::SaleEvent;
pub use guard::{GuardToken, ReentrancyGuard};
pub use ledger::{ParticipantIndex, VestingDetails, VestingLedger, VestingRecord};
pub use sale::{SaleConfig, TokenSale};

pub use xfish_economics::{NextRelease, PriceParameters, SaleStats};
