use std::str::FromStr;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::{AppError, Result};

/// Which number in a price-range string gets multiplied by the marker's rate.
///
/// `UsdAnchor` always takes the first `US$<amount>`, whatever marker was
/// detected. `LocalMarker` takes the amount written right after the detected
/// marker instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    #[default]
    UsdAnchor,
    LocalMarker,
}
impl FromStr for ConversionMode {
    type Err = AppError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd-anchor" => Ok(Self::UsdAnchor),
            "local-marker" => Ok(Self::LocalMarker),
            other => Err(AppError::ConfigError(format!(
                "PRICE_CONVERSION_MODE: expected 'usd-anchor' or 'local-marker', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyMarker {
    pub marker: &'static str,
    pub rate: f64,
}

/// Recognized markers. `CAN$` precedes `A$` since it contains it.
pub static MARKERS: [CurrencyMarker; 8] = [
    CurrencyMarker { marker: "US$", rate: 1.0 },
    CurrencyMarker { marker: "CAN$", rate: 0.75 },
    CurrencyMarker { marker: "A$", rate: 0.67 },
    CurrencyMarker { marker: "CNY", rate: 0.14 },
    CurrencyMarker { marker: "JPY", rate: 0.0069 },
    CurrencyMarker { marker: "KRW", rate: 0.00076 },
    CurrencyMarker { marker: "EUR", rate: 1.09 },
    CurrencyMarker { marker: "CHF", rate: 1.18 },
];

pub struct PriceConverter {
    mode: ConversionMode,
    usd_amount: Regex,
    local_amounts: Vec<Regex>,
}

impl PriceConverter {
    pub fn new(mode: ConversionMode) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::ConfigError(e.to_string()))
        };
        let usd_amount = compile(r"US\$(\d+\.\d+)")?;
        let local_amounts = MARKERS
            .iter()
            .map(|m| compile(&format!(r"{}\s?(\d+\.\d+)", regex::escape(m.marker))))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            mode,
            usd_amount,
            local_amounts,
        })
    }
    /// A local-currency marker wins over `US$`, which most price strings
    /// carry as the converted amount.
    pub fn detect(price_range: &str) -> Option<(usize, &'static CurrencyMarker)> {
        let found = |(_, m): &(usize, &CurrencyMarker)| price_range.contains(m.marker);
        let mut markers = MARKERS.iter().enumerate();
        let usd = markers.next().filter(found);
        markers.find(found).or(usd)
    }
    pub fn to_usd(&self, price_range: &str) -> Option<f64> {
        let (position, marker) = Self::detect(price_range)?;
        let pattern = match self.mode {
            ConversionMode::UsdAnchor => &self.usd_amount,
            ConversionMode::LocalMarker => &self.local_amounts[position],
        };
        let amount = pattern
            .captures(price_range)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        match amount {
            Some(amount) => Some(amount * marker.rate),
            None => {
                debug!(
                    "price range '{price_range}' has marker {} but no amount to convert",
                    marker.marker
                );
                None
            }
        }
    }
}
