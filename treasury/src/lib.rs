//! XFISH Sale Treasury Module
//!
//! Custody of the two sale assets:
//! - native currency received from purchases
//! - sale tokens funded by the operator
//!
//! Every outgoing transfer is checked against current holdings and recorded
//! in an audit trail together with the amount credited to the recipient.

pub mod error;
pub mod pool;

pub use pool::{
    Holdings,
    TransactionKind,
    TreasuryPool,
    TreasuryReport,
    TreasurySource,
    TreasuryStats,
    TreasuryTransaction,
    TreasuryWithdrawal,
    WithdrawalReason,
    REPORT_RECENT_TRANSACTIONS,
    RETAINED_TRANSACTIONS,
};

pub use error::{TreasuryError, Result};
