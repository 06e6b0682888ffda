//! Terminal rendering

use owo_colors::OwoColorize;
use xfish_core::{Address, Amount, Asset, Timestamp};
use xfish_sale::{SaleEvent, TokenSale};
use xfish_treasury::{TransactionKind, TreasurySource, TreasuryTransaction, WithdrawalReason};

use crate::commands::{native, tokens, Commands};
use crate::error::Result;

const RULE: &str = "═══════════════════════════════════════════════════";

fn header(title: &str) {
    println!("\n{}", RULE.cyan());
    println!("{}", title.cyan().bold());
    println!("{}", RULE.cyan());
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("{:<24} {}", format!("{}:", label).yellow().bold(), value);
}

pub fn format_time(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn flag(on: bool, yes: &str, no: &str) -> String {
    if on {
        yes.green().to_string()
    } else {
        no.bright_black().to_string()
    }
}

pub fn status(sale: &TokenSale, now: Timestamp) {
    header("XFISH TOKEN SALE");
    row("Owner", sale.owner());
    row("Token", sale.token());
    row("Active", flag(sale.is_active(), "yes", "no"));
    row("Paused", flag(sale.is_paused(), "yes", "no"));
    row("Price", format!("{} XFISH/USDT", sale.usdt_price()));
    row("ETH price", format!("{} USDT/ETH", sale.eth_price()));

    println!();
    row("Token balance", tokens(sale.contract_token_balance()).green());
    row("Native balance", native(sale.contract_native_balance()).green());
    row("Native raised", native(sale.total_native_raised()));
    row("Tokens sold", tokens(sale.total_tokens_sold()));
    row("Tokens released", tokens(sale.stats().total_tokens_released));
    row("Referral bonuses", tokens(sale.stats().total_referral_bonus));
    row("Vesting owed", tokens(sale.outstanding_obligations()));
    row("Purchases", sale.stats().purchase_count);
    row("Participants", sale.participant_count());

    let owed = sale.outstanding_obligations();
    if !sale.has_sufficient_balance(owed) {
        println!(
            "\n{} custody holds less than the outstanding vesting obligations",
            "⚠".yellow()
        );
    }
    row("As of", format_time(now).bright_black());
    println!();
}

pub fn vesting(sale: &TokenSale, address: &Address, now: Timestamp) {
    header("VESTING POSITION");
    row("Address", address);

    let Some(record) = sale.vesting_info(address) else {
        println!("{}", "No purchases recorded".bright_black());
        println!();
        return;
    };

    let details = sale.vesting_details(address, now);
    row("Purchased at", format_time(record.purchase_time));
    row("Total", tokens(details.total));
    row("Claimed", tokens(details.claimed));
    row("Claimable now", tokens(details.claimable).green());
    row("Locked", tokens(details.locked));

    let next = sale.next_release_info(address, now);
    if !next.amount.is_zero() {
        row(
            "Next release",
            format!("{} at {}", tokens(next.amount), format_time(next.release_time)),
        );
    } else {
        row("Next release", "fully vested".green());
    }
    println!();
}

pub fn participants(sale: &TokenSale) -> Result<()> {
    header("PARTICIPANTS");
    row("Total", sale.participant_count());

    for index in 0..sale.participant_count() {
        let buyer = sale.participant(index)?;
        let total: Amount = sale
            .vesting_info(&buyer)
            .map(|r| r.total_amount)
            .unwrap_or_default();
        println!("  {}. {} {}", index + 1, buyer, tokens(total).bright_white());
    }
    println!();
    Ok(())
}

pub fn quote(sale: &TokenSale, paid_amount: Amount) -> Result<()> {
    let amount = sale.calculate_token_amount(paid_amount)?;
    println!("{} buys {}", native(paid_amount), tokens(amount).green().bold());
    Ok(())
}

fn asset_amount(asset: Asset, amount: Amount) -> String {
    match asset {
        Asset::Native => native(amount),
        Asset::Token => tokens(amount),
    }
}

fn describe(kind: &TransactionKind) -> String {
    match kind {
        TransactionKind::Deposit(TreasurySource::Purchase { buyer }) => {
            format!("in   purchase by {}", buyer)
        }
        TransactionKind::Deposit(TreasurySource::Funding { from }) => {
            format!("in   funding from {}", from)
        }
        TransactionKind::Withdrawal(w) => {
            let reason = match &w.reason {
                WithdrawalReason::ImmediateUnlock => "immediate unlock".to_string(),
                WithdrawalReason::VestingClaim => "vesting claim".to_string(),
                WithdrawalReason::ReferralBonus { reason } => format!("referral ({})", reason),
                WithdrawalReason::OwnerWithdrawal => "owner withdrawal".to_string(),
                WithdrawalReason::EmergencyWithdrawal => "emergency".to_string(),
            };
            format!("out  {} to {}", reason, w.recipient)
        }
    }
}

fn transaction_line(tx: &TreasuryTransaction) -> String {
    format!(
        "#{:<5} {} {} {}",
        tx.id,
        format_time(tx.timestamp).bright_black(),
        asset_amount(tx.asset, tx.amount).bright_white(),
        describe(&tx.kind)
    )
}

pub fn report(sale: &TokenSale, now: Timestamp) {
    let report = sale.treasury().report(now);

    header("TREASURY REPORT");
    row("Token balance", tokens(report.balances.token).green());
    row("Native balance", native(report.balances.native).green());
    row("Tokens deposited", tokens(report.stats.total_deposited.token));
    row("Tokens paid out", tokens(report.stats.total_withdrawn.token));
    row("Native received", native(report.stats.total_deposited.native));
    row("Native paid out", native(report.stats.total_withdrawn.native));
    row("Transactions", report.stats.transaction_count);
    row("Recipients", report.recipient_count);

    if report.recent_transactions.is_empty() {
        println!("{}", "No transactions recorded".bright_black());
    } else {
        println!("\n{}", "Recent transactions".cyan().bold());
        for tx in &report.recent_transactions {
            println!("  {}", transaction_line(tx));
        }
    }
    row("As of", format_time(report.generated_at).bright_black());
    println!();
}

/// Render a read-only command. State-changing commands print nothing here.
pub fn render(sale: &TokenSale, command: &Commands, now: Timestamp) -> Result<()> {
    match command {
        Commands::Status => status(sale, now),
        Commands::Vesting { address } => vesting(sale, address, now),
        Commands::Participants => participants(sale)?,
        Commands::Quote { amount } => quote(sale, *amount)?,
        Commands::Report => report(sale, now),
        _ => {}
    }
    Ok(())
}

pub fn outcome(summary: &str, events: &[SaleEvent]) {
    if !summary.is_empty() {
        println!("{} {}", "✓".green(), summary);
    }
    for event in events {
        println!("  {} {}", "•".bright_black(), event.bright_white());
    }
}
