//! The fixed asset universe and its categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported assets, in universe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Asset {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "BNB")]
    Bnb,
    #[serde(rename = "SOL")]
    Sol,
    #[serde(rename = "XRP")]
    Xrp,
    #[serde(rename = "PENDLE")]
    Pendle,
    #[serde(rename = "SPX6900")]
    Spx6900,
}

/// Role an asset plays inside an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    /// Store-of-value anchor (BTC)
    PrimaryReserve,
    /// Ecosystem reserve (ETH)
    SecondaryReserve,
    /// Exchange token, treated as the stable pair
    Exchange,
    SmartContract,
    Payments,
    Defi,
    Speculative,
}

impl Asset {
    pub const ALL: [Asset; 7] = [
        Asset::Btc,
        Asset::Eth,
        Asset::Bnb,
        Asset::Sol,
        Asset::Xrp,
        Asset::Pendle,
        Asset::Spx6900,
    ];

    pub const PRIMARY_RESERVE: Asset = Asset::Btc;
    pub const SECONDARY_RESERVE: Asset = Asset::Eth;

    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
            Asset::Bnb => "BNB",
            Asset::Sol => "SOL",
            Asset::Xrp => "XRP",
            Asset::Pendle => "PENDLE",
            Asset::Spx6900 => "SPX6900",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Asset::Btc => "Bitcoin",
            Asset::Eth => "Ethereum",
            Asset::Bnb => "BNB",
            Asset::Sol => "Solana",
            Asset::Xrp => "XRP",
            Asset::Pendle => "Pendle",
            Asset::Spx6900 => "SPX6900",
        }
    }

    pub fn category(&self) -> AssetCategory {
        match self {
            Asset::Btc => AssetCategory::PrimaryReserve,
            Asset::Eth => AssetCategory::SecondaryReserve,
            Asset::Bnb => AssetCategory::Exchange,
            Asset::Sol => AssetCategory::SmartContract,
            Asset::Xrp => AssetCategory::Payments,
            Asset::Pendle => AssetCategory::Defi,
            Asset::Spx6900 => AssetCategory::Speculative,
        }
    }

    /// Everything except the two reserve assets.
    pub fn is_volatile(&self) -> bool {
        !matches!(
            self.category(),
            AssetCategory::PrimaryReserve | AssetCategory::SecondaryReserve
        )
    }

    pub fn is_speculative(&self) -> bool {
        self.category() == AssetCategory::Speculative
    }

    pub fn is_defi(&self) -> bool {
        self.category() == AssetCategory::Defi
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Asset::ALL
            .into_iter()
            .find(|a| a.symbol() == wanted)
            .ok_or_else(|| format!("unknown asset: {s}"))
    }
}
