use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::Serialize;

use crate::models::{Coin, Listing, QuoteUnit, Timeframe};

pub const MIN_TOP: usize = 1;
pub const MAX_TOP: usize = 100;

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct MarketFilter {
    #[builder(default)]
    pub unit: QuoteUnit,
    // None selects every coin
    #[builder(setter(into, strip_option), default)]
    pub coins: Option<Vec<String>>,
    #[builder(default = "MAX_TOP")]
    pub top: usize,
    #[builder(default)]
    pub timeframe: Timeframe,
    #[builder(default = "true")]
    pub sort: bool,
}
impl MarketFilter {
    pub fn builder() -> MarketFilterBuilder {
        MarketFilterBuilder::default()
    }
    pub fn limit(&self, available: usize) -> usize {
        self.top.clamp(MIN_TOP, MAX_TOP).min(available)
    }
    fn selects(&self, coin: &Coin) -> bool {
        match &self.coins {
            Some(symbols) => symbols
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(&coin.coin_symbol)),
            None => true,
        }
    }
}
impl Default for MarketFilter {
    fn default() -> Self {
        Self {
            unit: QuoteUnit::default(),
            coins: None,
            top: MAX_TOP,
            timeframe: Timeframe::default(),
            sort: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub coin_symbol: String,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub positive_percent_change_1h: bool,
    pub positive_percent_change_24h: bool,
    pub positive_percent_change_7d: bool,
}
impl From<&Coin> for ChangeRow {
    fn from(coin: &Coin) -> Self {
        let positive = |v: Option<f64>| v.is_some_and(|v| v > 0.0);
        Self {
            coin_symbol: coin.coin_symbol.clone(),
            percent_change_1h: coin.percent_change_1h,
            percent_change_24h: coin.percent_change_24h,
            percent_change_7d: coin.percent_change_7d,
            positive_percent_change_1h: positive(coin.percent_change_1h),
            positive_percent_change_24h: positive(coin.percent_change_24h),
            positive_percent_change_7d: positive(coin.percent_change_7d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub coin_symbol: String,
    pub value: Option<f64>,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub timeframe: Timeframe,
    pub label: &'static str,
    pub column: &'static str,
    pub sorted: bool,
    pub points: Vec<BarPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketView {
    pub source: String,
    pub unit: QuoteUnit,
    pub fetched_at: DateTime<Utc>,
    pub coin_options: Vec<String>,
    pub dimension: Dimension,
    pub coins: Vec<Coin>,
    pub change_table: Vec<ChangeRow>,
    pub bar_chart: BarChart,
}

pub fn select<'a>(coins: &'a [Coin], filter: &MarketFilter) -> Vec<&'a Coin> {
    coins.iter().filter(|c| filter.selects(c)).collect()
}

// absent values last
fn ascending(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn bar_chart(rows: &[&Coin], timeframe: Timeframe, sort: bool) -> BarChart {
    let mut points = rows
        .iter()
        .map(|coin| {
            let value = coin.percent_change(timeframe);
            BarPoint {
                coin_symbol: coin.coin_symbol.clone(),
                value,
                color: if value.is_some_and(|v| v > 0.0) { "green" } else { "red" },
            }
        })
        .collect::<Vec<_>>();
    if sort {
        points.sort_by(|a, b| ascending(&a.value, &b.value));
    }
    BarChart {
        timeframe,
        label: timeframe.label(),
        column: timeframe.column(),
        sorted: sort,
        points,
    }
}

pub fn apply(listing: &Listing, filter: &MarketFilter, source: &str) -> MarketView {
    let mut coin_options = listing
        .coins
        .iter()
        .map(|c| c.coin_symbol.clone())
        .collect::<Vec<_>>();
    coin_options.sort();
    let selected = select(&listing.coins, filter);
    let dimension = Dimension {
        rows: selected.len(),
        columns: Coin::COLUMNS.len(),
    };
    let shown = &selected[..filter.limit(selected.len())];
    MarketView {
        source: source.to_string(),
        unit: listing.unit,
        fetched_at: listing.fetched_at,
        coin_options,
        dimension,
        coins: shown.iter().map(|c| (*c).clone()).collect(),
        change_table: shown.iter().map(|c| ChangeRow::from(*c)).collect(),
        bar_chart: bar_chart(shown, filter.timeframe, filter.sort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn coin(rank: usize, symbol: &str, h1: Option<f64>, h24: f64, d7: f64) -> Coin {
        Coin {
            rank,
            id: rank.to_string(),
            coin_name: symbol.to_lowercase(),
            coin_symbol: symbol.to_string(),
            market_cap: Some(1000.0 / rank as f64),
            percent_change_1h: h1,
            percent_change_24h: Some(h24),
            percent_change_7d: Some(d7),
            price: Some(10.0 * rank as f64),
            volume_24h: Some(5.0),
        }
    }

    fn listing() -> Listing {
        Listing {
            unit: QuoteUnit::Usd,
            coins: vec![
                coin(1, "BTC", Some(0.4), -1.0, 3.0),
                coin(2, "ETH", None, 2.0, -5.0),
                coin(3, "USDT", Some(0.0), 0.0, 0.0),
                coin(4, "SOL", Some(-2.0), 2.0, 9.0),
                coin(5, "ADA", Some(1.5), -3.0, 3.0),
            ],
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_builder_defaults() -> Result<()> {
        let filter = MarketFilter::builder().build()?;
        assert_eq!(filter, MarketFilter::default());
        let custom = MarketFilter::builder()
            .coins(vec!["BTC".to_string()])
            .top(3)
            .timeframe(Timeframe::Hour)
            .sort(false)
            .build()?;
        assert_eq!(custom.coins.as_deref(), Some(&["BTC".to_string()][..]));
        assert!(!custom.sort);
        Ok(())
    }

    #[test]
    fn test_top_n_keeps_order() -> Result<()> {
        let listing = listing();
        for n in [1, 2, 3, 5, 100] {
            let filter = MarketFilter::builder().top(n).sort(false).build()?;
            let view = apply(&listing, &filter, "test");
            assert!(view.coins.len() <= n);
            let ranks: Vec<_> = view.coins.iter().map(|c| c.rank).collect();
            let mut sorted = ranks.clone();
            sorted.sort();
            assert_eq!(ranks, sorted);
        }
        Ok(())
    }

    #[test]
    fn test_top_is_clamped() -> Result<()> {
        let listing = listing();
        let zero = apply(&listing, &MarketFilter::builder().top(0).build()?, "test");
        assert_eq!(zero.coins.len(), 1);
        let huge = apply(&listing, &MarketFilter::builder().top(1000).build()?, "test");
        assert_eq!(huge.coins.len(), 5);
        Ok(())
    }

    #[test]
    fn test_coin_selection() -> Result<()> {
        let listing = listing();
        let filter = MarketFilter::builder()
            .coins(vec!["sol".to_string(), "BTC".to_string()])
            .build()?;
        let view = apply(&listing, &filter, "test");
        let symbols: Vec<_> = view.coins.iter().map(|c| c.coin_symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "SOL"]);
        assert_eq!(view.dimension, Dimension { rows: 2, columns: 8 });
        assert_eq!(view.coin_options, vec!["ADA", "BTC", "ETH", "SOL", "USDT"]);
        Ok(())
    }

    #[test]
    fn test_sorted_bar_chart_is_non_decreasing() -> Result<()> {
        let listing = listing();
        for timeframe in [Timeframe::Hour, Timeframe::Day, Timeframe::Week] {
            let filter = MarketFilter::builder().timeframe(timeframe).build()?;
            let view = apply(&listing, &filter, "test");
            let values: Vec<f64> = view.bar_chart.points.iter().filter_map(|p| p.value).collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{timeframe:?}: {values:?}");
            // absent values trail
            let first_none = view.bar_chart.points.iter().position(|p| p.value.is_none());
            if let Some(i) = first_none {
                assert!(view.bar_chart.points[i..].iter().all(|p| p.value.is_none()));
            }
        }
        Ok(())
    }

    #[test]
    fn test_sort_is_stable_and_leaves_table_alone() -> Result<()> {
        let listing = listing();
        let filter = MarketFilter::builder().timeframe(Timeframe::Week).build()?;
        let view = apply(&listing, &filter, "test");
        let bars: Vec<_> = view.bar_chart.points.iter().map(|p| p.coin_symbol.as_str()).collect();
        assert_eq!(bars, vec!["ETH", "USDT", "BTC", "ADA", "SOL"]);
        let table: Vec<_> = view.change_table.iter().map(|r| r.coin_symbol.as_str()).collect();
        assert_eq!(table, vec!["BTC", "ETH", "USDT", "SOL", "ADA"]);
        Ok(())
    }

    #[test]
    fn test_unsorted_bar_chart_and_colors() -> Result<()> {
        let listing = listing();
        let filter = MarketFilter::builder()
            .timeframe(Timeframe::Hour)
            .sort(false)
            .build()?;
        let view = apply(&listing, &filter, "test");
        let colors: Vec<_> = view.bar_chart.points.iter().map(|p| p.color).collect();
        assert_eq!(colors, vec!["green", "red", "red", "red", "green"]);
        assert!(view.change_table[0].positive_percent_change_1h);
        assert!(!view.change_table[2].positive_percent_change_24h);
        assert_eq!(view.bar_chart.label, "1 hour period");
        Ok(())
    }

    #[test]
    fn test_base_listing_untouched() -> Result<()> {
        let listing = listing();
        let before = listing.coins.clone();
        let filter = MarketFilter::builder().top(2).coins(vec!["ETH".to_string()]).build()?;
        let _ = apply(&listing, &filter, "test");
        assert_eq!(listing.coins, before);
        Ok(())
    }
}
