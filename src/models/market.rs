use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteUnit {
    #[default]
    Usd,
    Btc,
    Eth,
}
impl QuoteUnit {
    pub const ALL: [QuoteUnit; 3] = [QuoteUnit::Usd, QuoteUnit::Btc, QuoteUnit::Eth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Btc => "BTC",
            Self::Eth => "ETH",
        }
    }
    pub(crate) fn slot(&self) -> usize {
        match self {
            Self::Usd => 0,
            Self::Btc => 1,
            Self::Eth => 2,
        }
    }
}
impl Display for QuoteUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
impl FromStr for QuoteUnit {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "BTC" => Ok(Self::Btc),
            "ETH" => Ok(Self::Eth),
            other => Err(AppError::QueryError(format!("unknown quote unit '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
}
impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
            Self::Week => "7d",
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hour => "1 hour period",
            Self::Day => "24 hour period",
            Self::Week => "7 days period",
        }
    }
    pub fn column(&self) -> &'static str {
        match self {
            Self::Hour => "percent_change_1h",
            Self::Day => "percent_change_24h",
            Self::Week => "percent_change_7d",
        }
    }
}
impl FromStr for Timeframe {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(Self::Hour),
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            other => Err(AppError::QueryError(format!("unknown timeframe '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub rank: usize,
    pub id: String,
    pub coin_name: String,
    pub coin_symbol: String,
    pub market_cap: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub price: Option<f64>,
    pub volume_24h: Option<f64>,
}
impl Coin {
    pub const COLUMNS: [&'static str; 8] = [
        "coin_name",
        "coin_symbol",
        "market_cap",
        "percent_change_1h",
        "percent_change_24h",
        "percent_change_7d",
        "price",
        "volume_24h",
    ];

    pub fn percent_change(&self, timeframe: Timeframe) -> Option<f64> {
        match timeframe {
            Timeframe::Hour => self.percent_change_1h,
            Timeframe::Day => self.percent_change_24h,
            Timeframe::Week => self.percent_change_7d,
        }
    }
    pub fn record(&self) -> Vec<String> {
        let num = |v: Option<f64>| v.map(|n| format!("{n:?}")).unwrap_or_default();
        vec![
            self.coin_name.clone(),
            self.coin_symbol.clone(),
            num(self.market_cap),
            num(self.percent_change_1h),
            num(self.percent_change_24h),
            num(self.percent_change_7d),
            num(self.price),
            num(self.volume_24h),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub unit: QuoteUnit,
    pub coins: Vec<Coin>,
    pub fetched_at: DateTime<Utc>,
}
