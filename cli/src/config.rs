//! `xfish-sale.toml` loading

use serde::Deserialize;
use std::path::{Path, PathBuf};
use xfish_core::constants::DECIMALS;
use xfish_core::{parse_units, Address, Amount};
use xfish_economics::constants::{DEFAULT_ETH_PRICE, DEFAULT_USDT_PRICE};
use xfish_sale::SaleConfig;

use crate::error::{CliError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "./xfish-sale.toml";
pub const DEFAULT_DATA_DIR: &str = "./xfish-data";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sale: SaleSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleSection {
    pub owner: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_usdt_price")]
    pub usdt_price: u64,
    #[serde(default = "default_eth_price")]
    pub eth_price: u64,
    /// Whole tokens funded at init
    pub initial_supply: Option<String>,
}

impl Default for SaleSection {
    fn default() -> Self {
        Self {
            owner: None,
            token: None,
            usdt_price: DEFAULT_USDT_PRICE,
            eth_price: DEFAULT_ETH_PRICE,
            initial_supply: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_usdt_price() -> u64 {
    DEFAULT_USDT_PRICE
}

fn default_eth_price() -> u64 {
    DEFAULT_ETH_PRICE
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))
}

/// Load the config, falling back to defaults when it is missing or broken.
/// Runs before the logger exists, so problems go straight to stderr.
pub fn load_config_or_default(path: &Path) -> Config {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

impl SaleSection {
    pub fn to_sale_config(&self) -> Result<SaleConfig> {
        Ok(SaleConfig {
            owner: required_address("sale.owner", self.owner.as_deref())?,
            token: required_address("sale.token", self.token.as_deref())?,
            usdt_price: self.usdt_price,
            eth_price: self.eth_price,
        })
    }

    pub fn initial_supply(&self) -> Result<Option<Amount>> {
        self.initial_supply
            .as_deref()
            .map(|s| parse_units(s, DECIMALS).map_err(CliError::from))
            .transpose()
    }
}

fn required_address(key: &str, value: Option<&str>) -> Result<Address> {
    let value = value.ok_or_else(|| CliError::Config(format!("{} is not set", key)))?;
    Ok(value.parse()?)
}
