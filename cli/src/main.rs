//! XFISH Sale CLI - operate a token sale stored on local disk

mod commands;
mod config;
mod display;
mod error;

use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use xfish_core::Timestamp;
use xfish_sale::TokenSale;
use xfish_storage::{Storage, SALE_SNAPSHOT};

use commands::Commands;
use config::{load_config_or_default, Config, DEFAULT_CONFIG_PATH};
use error::{CliError, Result};

#[derive(Parser, Debug)]
#[command(name = "xfish-sale")]
#[command(about = "XFISH token sale operator tool", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Act as if the current time were this unix timestamp
    #[arg(long, value_name = "UNIX_SECS")]
    at: Option<Timestamp>,

    #[command(subcommand)]
    command: Commands,
}

/// Convert wall-clock seconds, refusing a clock set before 1970
fn timestamp_from_unix(secs: i64) -> Result<Timestamp> {
    Timestamp::try_from(secs).map_err(|_| CliError::ClockBeforeEpoch(secs))
}

fn current_time() -> Result<Timestamp> {
    timestamp_from_unix(chrono::Utc::now().timestamp())
}

fn run(command: &Commands, config: &Config, now: Timestamp) -> Result<()> {
    let storage = Storage::open(&config.storage.data_dir)?;
    let location = storage.data_dir().display().to_string();

    if let Commands::Init = command {
        if storage.has_snapshot(SALE_SNAPSHOT) {
            return Err(CliError::AlreadyInitialized(location));
        }
        let mut sale = commands::init_sale(&config.sale, now)?;
        let events = sale.take_events();
        storage.save_snapshot(SALE_SNAPSHOT, &sale)?;
        log::info!("sale initialised in {}", location);
        display::outcome("Sale created", &events);
        return Ok(());
    }

    let mut sale: TokenSale = storage
        .try_load_snapshot(SALE_SNAPSHOT)?
        .ok_or(CliError::NotInitialized(location))?;
    sale.validate()?;

    if command.is_read_only() {
        return display::render(&sale, command, now);
    }

    // Nothing is written unless the operation succeeded
    let summary = commands::apply(&mut sale, command, now)?;
    let events = sale.take_events();
    storage.save_snapshot(SALE_SNAPSHOT, &sale)?;
    display::outcome(&summary, &events);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config_or_default(&config_path);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let result = match cli.at {
        Some(at) => Ok(at),
        None => current_time(),
    }
    .and_then(|now| {
        log::debug!("using config {} at time {}", config_path.display(), now);
        run(&cli.command, &config, now)
    });

    if let Err(e) = result {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use xfish_core::constants::UNIT;
    use xfish_core::{Address, Amount};
    use xfish_sale::SaleError;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";
    const BUYER: &str = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.sale.owner = Some(OWNER.to_string());
        config.sale.token = Some("0x7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f".to_string());
        config.sale.initial_supply = Some("1000000".to_string());
        config.storage.data_dir = dir.join("data");
        config
    }

    fn load(config: &Config) -> TokenSale {
        Storage::open(&config.storage.data_dir)
            .unwrap()
            .load_snapshot(SALE_SNAPSHOT)
            .unwrap()
    }

    #[test]
    fn test_parse_command_line() {
        let cli = Cli::try_parse_from([
            "xfish-sale",
            "--at",
            "1700000000",
            "buy",
            "--buyer",
            BUYER,
            "--amount",
            "0.1",
        ])
        .unwrap();

        assert_eq!(cli.at, Some(1_700_000_000));
        assert_eq!(
            cli.command,
            Commands::Buy {
                buyer: BUYER.parse().unwrap(),
                amount: UNIT / Amount::from(10u64),
            }
        );
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["xfish-sale", "claim", "--buyer", "0x12"]).is_err());
        assert!(Cli::try_parse_from(["xfish-sale", "quote", "--amount", "lots"]).is_err());
        assert!(Cli::try_parse_from([
            "xfish-sale",
            "emergency-withdraw",
            "--caller",
            OWNER,
            "--asset",
            "gold",
            "--amount",
            "1"
        ])
        .is_err());
    }

    #[test]
    fn test_state_persists_between_runs() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let owner: Address = OWNER.parse().unwrap();
        let buyer: Address = BUYER.parse().unwrap();

        run(&Commands::Init, &config, 100).unwrap();
        assert!(matches!(
            run(&Commands::Init, &config, 100),
            Err(CliError::AlreadyInitialized(_))
        ));

        run(&Commands::Start { caller: owner }, &config, 100).unwrap();
        run(
            &Commands::Buy {
                buyer,
                amount: UNIT / Amount::from(100u64),
            },
            &config,
            200,
        )
        .unwrap();

        let sale = load(&config);
        assert!(sale.is_active());
        assert!(sale.has_participated(&buyer));
        assert!(sale.events().is_empty());
    }

    #[test]
    fn test_failed_operation_is_not_saved() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let buyer: Address = BUYER.parse().unwrap();

        run(&Commands::Init, &config, 100).unwrap();
        // Sale not started yet
        let err = run(
            &Commands::Buy {
                buyer,
                amount: UNIT / Amount::from(100u64),
            },
            &config,
            200,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Sale(_)));

        let sale = load(&config);
        assert!(!sale.has_participated(&buyer));
        assert_eq!(sale.contract_native_balance(), Amount::ZERO);
    }

    #[test]
    fn test_commands_need_an_initialised_sale() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        assert!(matches!(
            run(&Commands::Status, &config, 0),
            Err(CliError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_clock_before_epoch_is_an_error() {
        assert_eq!(timestamp_from_unix(1_700_000_000).unwrap(), 1_700_000_000);
        assert_eq!(timestamp_from_unix(0).unwrap(), 0);
        assert!(matches!(
            timestamp_from_unix(-1),
            Err(CliError::ClockBeforeEpoch(-1))
        ));
    }

    #[test]
    fn test_read_only_commands_leave_snapshot_untouched() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let owner: Address = OWNER.parse().unwrap();

        run(&Commands::Init, &config, 100).unwrap();
        run(&Commands::Start { caller: owner }, &config, 100).unwrap();
        let snapshot = config.storage.data_dir.join("sale.json");
        let before = std::fs::read_to_string(&snapshot).unwrap();

        run(&Commands::Report, &config, 200).unwrap();
        run(&Commands::Status, &config, 200).unwrap();
        run(&Commands::Quote { amount: UNIT }, &config, 200).unwrap();
        assert_eq!(std::fs::read_to_string(&snapshot).unwrap(), before);
    }

    #[test]
    fn test_corrupted_snapshot_is_rejected() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let owner: Address = OWNER.parse().unwrap();
        let buyer: Address = BUYER.parse().unwrap();

        run(&Commands::Init, &config, 100).unwrap();
        run(&Commands::Start { caller: owner }, &config, 100).unwrap();
        run(
            &Commands::Buy {
                buyer,
                amount: UNIT / Amount::from(100u64),
            },
            &config,
            200,
        )
        .unwrap();

        // Hand-edit the JSON copy so the buyer has claimed more than they own
        let data_dir = &config.storage.data_dir;
        std::fs::remove_file(data_dir.join("sale.bin")).unwrap();
        let path = data_dir.join("sale.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let record = &mut value["ledger"]["records"][BUYER];
        record["claimed_amount"] = record["total_amount"].clone();
        record["total_amount"] = serde_json::to_value(Amount::from(1u64)).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();

        let err = run(&Commands::Vesting { address: buyer }, &config, 300).unwrap_err();
        assert!(matches!(err, CliError::Sale(SaleError::InvalidState(_))));
        assert!(run(&Commands::Claim { buyer }, &config, 300).is_err());
    }
}
