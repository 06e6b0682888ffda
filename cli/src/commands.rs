//! Subcommands and how they act on a loaded sale

use clap::Subcommand;
use xfish_core::constants::DECIMALS;
use xfish_core::{format_units, parse_units, Address, Amount, Asset, Timestamp};
use xfish_sale::TokenSale;

use crate::config::SaleSection;
use crate::error::Result;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the sale from the [sale] config section
    Init,

    /// Open the sale for purchases
    Start {
        #[arg(long)]
        caller: Address,
    },

    /// Close the sale for purchases
    End {
        #[arg(long)]
        caller: Address,
    },

    /// Halt purchases and claims
    Pause {
        #[arg(long)]
        caller: Address,
    },

    /// Resume purchases and claims
    Unpause {
        #[arg(long)]
        caller: Address,
    },

    /// Set new prices (applies to future purchases only)
    UpdatePrices {
        #[arg(long)]
        caller: Address,
        /// Tokens per USDT
        #[arg(long)]
        usdt_price: u64,
        /// USDT per native unit
        #[arg(long)]
        eth_price: u64,
    },

    /// Move sale tokens into custody
    Fund {
        #[arg(long)]
        caller: Address,
        /// Whole tokens, decimals allowed
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },

    /// Buy tokens with native currency
    Buy {
        #[arg(long)]
        buyer: Address,
        /// Native units paid, decimals allowed (0.1 = 10^17 base units)
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },

    /// Claim unlocked tokens
    Claim {
        #[arg(long)]
        buyer: Address,
    },

    /// Send all collected native currency to the owner
    WithdrawEth {
        #[arg(long)]
        caller: Address,
    },

    /// Send an arbitrary amount of either asset to the owner
    EmergencyWithdraw {
        #[arg(long)]
        caller: Address,
        /// native or token
        #[arg(long)]
        asset: Asset,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },

    /// Pay a referral bonus in tokens
    Referral {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        recipient: Address,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
        #[arg(long)]
        reason: String,
    },

    /// Hand the owner role to another address
    TransferOwnership {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        new_owner: Address,
    },

    /// Show sale state and totals
    Status,

    /// Show a buyer's vesting position
    Vesting {
        #[arg(long)]
        address: Address,
    },

    /// List participants in first-purchase order
    Participants,

    /// Price a purchase without making it
    Quote {
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },

    /// Treasury balances, running totals and recent transfers
    Report,
}

impl Commands {
    /// Commands that never change the stored sale
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Commands::Status
                | Commands::Vesting { .. }
                | Commands::Participants
                | Commands::Quote { .. }
                | Commands::Report
        )
    }
}

/// Decimal string in whole units to base units
pub fn parse_amount(value: &str) -> std::result::Result<Amount, String> {
    parse_units(value, DECIMALS).map_err(|e| e.to_string())
}

pub fn init_sale(section: &SaleSection, now: Timestamp) -> Result<TokenSale> {
    let config = section.to_sale_config()?;
    let owner = config.owner;
    let mut sale = TokenSale::new(config)?;

    if let Some(supply) = section.initial_supply()? {
        if !supply.is_zero() {
            sale.fund_tokens(&owner, supply, now)?;
        }
    }
    Ok(sale)
}

/// Apply a state-changing command. Returns a one-line summary.
pub fn apply(sale: &mut TokenSale, command: &Commands, now: Timestamp) -> Result<String> {
    let summary = match command {
        Commands::Start { caller } => {
            sale.start_sale(caller)?;
            "Sale started".to_string()
        }
        Commands::End { caller } => {
            sale.end_sale(caller)?;
            "Sale ended".to_string()
        }
        Commands::Pause { caller } => {
            sale.pause(caller)?;
            "Sale paused".to_string()
        }
        Commands::Unpause { caller } => {
            sale.unpause(caller)?;
            "Sale unpaused".to_string()
        }
        Commands::UpdatePrices {
            caller,
            usdt_price,
            eth_price,
        } => {
            sale.update_prices(caller, *usdt_price, *eth_price)?;
            format!("Prices set to {} tokens/USDT, {} USDT/ETH", usdt_price, eth_price)
        }
        Commands::Fund { caller, amount } => {
            sale.fund_tokens(caller, *amount, now)?;
            format!("Funded {}", tokens(*amount))
        }
        Commands::Buy { buyer, amount } => {
            let bought = sale.buy_tokens(buyer, *amount, now)?;
            format!("{} bought {} for {}", buyer, tokens(bought), native(*amount))
        }
        Commands::Claim { buyer } => {
            let claimed = sale.claim_tokens(buyer, now)?;
            format!("{} claimed {}", buyer, tokens(claimed))
        }
        Commands::WithdrawEth { caller } => {
            let amount = sale.withdraw_eth(caller, now)?;
            format!("Withdrew {} to {}", native(amount), sale.owner())
        }
        Commands::EmergencyWithdraw {
            caller,
            asset,
            amount,
        } => {
            sale.emergency_withdraw(caller, *asset, *amount, now)?;
            let shown = match asset {
                Asset::Native => native(*amount),
                Asset::Token => tokens(*amount),
            };
            format!("Emergency withdrawal of {} to {}", shown, sale.owner())
        }
        Commands::Referral {
            caller,
            recipient,
            amount,
            reason,
        } => {
            sale.transfer_referral_bonus(caller, recipient, *amount, reason, now)?;
            format!("Referral bonus of {} sent to {}", tokens(*amount), recipient)
        }
        Commands::TransferOwnership { caller, new_owner } => {
            sale.transfer_ownership(caller, *new_owner)?;
            format!("Ownership transferred to {}", new_owner)
        }
        Commands::Init
        | Commands::Status
        | Commands::Vesting { .. }
        | Commands::Participants
        | Commands::Quote { .. }
        | Commands::Report => String::new(),
    };
    Ok(summary)
}

pub fn tokens(amount: Amount) -> String {
    format!("{} XFISH", format_units(amount, DECIMALS))
}

pub fn native(amount: Amount) -> String {
    format!("{} ETH", format_units(amount, DECIMALS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfish_core::constants::{MONTH_DURATION, UNIT};
    use xfish_sale::SaleError;

    use crate::error::CliError;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";

    fn section() -> SaleSection {
        SaleSection {
            owner: Some(OWNER.to_string()),
            token: Some("0x7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f".to_string()),
            initial_supply: Some("1000000".to_string()),
            ..SaleSection::default()
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.1").unwrap(), UNIT / Amount::from(10u64));
        assert_eq!(parse_amount("2").unwrap(), Amount::from(2u64) * UNIT);
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_init_funds_initial_supply() {
        let sale = init_sale(&section(), 0).unwrap();
        assert_eq!(
            sale.contract_token_balance(),
            Amount::from(1_000_000u64) * UNIT
        );
        assert!(!sale.is_active());
    }

    #[test]
    fn test_apply_purchase_flow() {
        let owner: Address = OWNER.parse().unwrap();
        let buyer = Address::repeat_byte(0xa1);
        let mut sale = init_sale(&section(), 0).unwrap();

        apply(&mut sale, &Commands::Start { caller: owner }, 0).unwrap();
        let summary = apply(
            &mut sale,
            &Commands::Buy {
                buyer,
                amount: UNIT / Amount::from(100u64),
            },
            10,
        )
        .unwrap();
        assert!(summary.contains("bought"));

        let summary = apply(&mut sale, &Commands::Claim { buyer }, 10 + MONTH_DURATION).unwrap();
        assert!(summary.contains("claimed"));
        assert_eq!(sale.participant_count(), 1);
    }

    #[test]
    fn test_apply_surfaces_sale_errors() {
        let mut sale = init_sale(&section(), 0).unwrap();
        let stranger = Address::repeat_byte(0x99);

        let err = apply(&mut sale, &Commands::Start { caller: stranger }, 0).unwrap_err();
        assert!(matches!(
            err,
            CliError::Sale(SaleError::Unauthorized { .. })
        ));
        assert!(!sale.is_active());
    }

    #[test]
    fn test_amounts_render_past_u128() {
        let huge = Amount::from(u128::MAX) * Amount::from(1_000u64);
        let shown = tokens(huge * UNIT);
        assert_eq!(shown, format!("{}000 XFISH", u128::MAX));
    }

    #[test]
    fn test_read_only_commands() {
        assert!(Commands::Status.is_read_only());
        assert!(Commands::Quote { amount: UNIT }.is_read_only());
        assert!(Commands::Report.is_read_only());
        assert!(!Commands::Init.is_read_only());
        assert!(!Commands::Claim {
            buyer: Address::ZERO
        }
        .is_read_only());
    }
}
