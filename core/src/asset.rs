//! Custodied asset selector

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two assets held in sale custody
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    /// Native currency paid by buyers
    Native,
    /// The token being sold
    Token,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Native => "native",
            Asset::Token => "token",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "eth" => Ok(Asset::Native),
            "token" | "xfish" => Ok(Asset::Token),
            other => Err(CoreError::InvalidAsset(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_from_str() {
        assert_eq!("native".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!("ETH".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!("Token".parse::<Asset>().unwrap(), Asset::Token);
        assert!("usdt".parse::<Asset>().is_err());
    }
}
