use xfish_core::{Address, Amount, Asset};
use xfish_treasury::*;

fn amt(n: u64) -> Amount {
    Amount::from(n)
}

#[test]
fn test_treasury_basic_flow() {
    let mut pool = TreasuryPool::new();
    let owner = Address::repeat_byte(0x01);
    let buyer = Address::repeat_byte(0xb0);

    pool.deposit(Asset::Token, amt(1_000_000), TreasurySource::Funding { from: owner }, 10)
        .unwrap();
    pool.deposit(Asset::Native, amt(5_000), TreasurySource::Purchase { buyer }, 11)
        .unwrap();
    pool.withdraw(Asset::Token, buyer, amt(100), WithdrawalReason::ImmediateUnlock, 11)
        .unwrap();
    pool.withdraw(Asset::Native, owner, amt(5_000), WithdrawalReason::OwnerWithdrawal, 12)
        .unwrap();

    assert_eq!(pool.balances(), Holdings { native: Amount::ZERO, token: amt(999_900) });
    assert_eq!(pool.credited(&buyer, Asset::Token), amt(100));
    assert_eq!(pool.credited(&owner, Asset::Native), amt(5_000));
    assert!(pool.has_sufficient(Asset::Token, amt(999_900)));
    assert!(!pool.has_sufficient(Asset::Token, amt(999_901)));
}

#[test]
fn test_referral_reason_recorded() {
    let mut pool = TreasuryPool::new();
    let owner = Address::repeat_byte(0x01);
    let friend = Address::repeat_byte(0xf1);

    pool.deposit(Asset::Token, amt(500), TreasurySource::Funding { from: owner }, 1)
        .unwrap();
    pool.withdraw(
        Asset::Token,
        friend,
        amt(200),
        WithdrawalReason::ReferralBonus {
            reason: "Level 1 Referral".to_string(),
        },
        2,
    )
    .unwrap();

    match &pool.transactions()[1].kind {
        TransactionKind::Withdrawal(w) => {
            assert_eq!(w.recipient, friend);
            assert_eq!(
                w.reason,
                WithdrawalReason::ReferralBonus {
                    reason: "Level 1 Referral".to_string()
                }
            );
        }
        other => panic!("unexpected transaction {:?}", other),
    }
}

#[test]
fn test_pool_survives_serialization() {
    let mut pool = TreasuryPool::new();
    let owner = Address::repeat_byte(0x01);
    pool.deposit(Asset::Token, amt(42), TreasurySource::Funding { from: owner }, 1)
        .unwrap();
    pool.withdraw(Asset::Token, owner, amt(2), WithdrawalReason::EmergencyWithdrawal, 2)
        .unwrap();

    let json = serde_json::to_string(&pool).unwrap();
    let restored: TreasuryPool = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.balances(), pool.balances());
    assert_eq!(restored.credited(&owner, Asset::Token), amt(2));
    assert_eq!(restored.transactions(), pool.transactions());
}
