use thiserror::Error;
use xfish_core::CoreError;
use xfish_sale::SaleError;
use xfish_storage::StorageError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sale(#[from] SaleError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No sale found in {0}; run `xfish-sale init` first")]
    NotInitialized(String),

    #[error("A sale already exists in {0}")]
    AlreadyInitialized(String),

    #[error("System clock reads {0}, before the Unix epoch; pass --at to set the time")]
    ClockBeforeEpoch(i64),
}

pub type Result<T> = std::result::Result<T, CliError>;
