mod cache;
pub mod filter;
pub mod parser;
mod web_spider;

pub use cache::{CachePolicy, ListingCache};
pub use filter::{MarketFilter, MarketView};

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use web_spider::Spider;

use crate::{
    models::{Coin, Listing, QuoteUnit},
    utils, Result,
};

pub struct MarketService {
    spider: Spider,
    url: String,
    cache: ListingCache,
}

impl MarketService {
    pub fn new(url: impl Into<String>, policy: CachePolicy) -> Result<Self> {
        Ok(Self {
            spider: Spider::new()?,
            url: url.into(),
            cache: ListingCache::new(policy),
        })
    }

    #[instrument(name = "market listing", skip(self))]
    pub async fn listing(&self, unit: QuoteUnit) -> Result<Arc<Listing>> {
        self.cache
            .get_or_load(unit, || async {
                let html = self.spider.get_page(&self.url).await?;
                let coins = parser::extract(&html, unit)?;
                info!("Scraped {} coins quoted in {unit}", coins.len());
                Ok(Listing {
                    unit,
                    coins,
                    fetched_at: Utc::now(),
                })
            })
            .await
    }

    pub async fn view(&self, filter: &MarketFilter) -> Result<MarketView> {
        let listing = self.listing(filter.unit).await?;
        Ok(filter::apply(&listing, filter, &self.url))
    }

    // whole selection, top-N does not apply
    pub async fn csv(&self, filter: &MarketFilter) -> Result<String> {
        let listing = self.listing(filter.unit).await?;
        let selected = filter::select(&listing.coins, filter);
        Ok(utils::to_csv(
            &Coin::COLUMNS,
            selected.iter().map(|c| c.record()),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Timeframe;
    use anyhow::Result;
    use axum::{routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) async fn serve_page(page: String) -> Result<(String, Arc<AtomicUsize>)> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let page = page.clone();
                async move { axum::response::Html(page) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok((format!("http://{addr}/"), hits))
    }

    #[tokio::test]
    async fn test_listing_is_scraped_once() -> Result<()> {
        let (url, hits) = serve_page(parser::tests::sample_page()).await?;
        let service = MarketService::new(url, CachePolicy::Process)?;
        let first = service.listing(QuoteUnit::Usd).await?;
        let second = service.listing(QuoteUnit::Usd).await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let eth = service.listing(QuoteUnit::Eth).await?;
        assert_eq!(eth.unit, QuoteUnit::Eth);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_view_and_csv() -> Result<()> {
        let (url, _) = serve_page(parser::tests::sample_page()).await?;
        let service = MarketService::new(url, CachePolicy::Disabled)?;
        let filter = MarketFilter::builder()
            .top(2)
            .timeframe(Timeframe::Day)
            .build()?;
        let view = service.view(&filter).await?;
        assert_eq!(view.coins.len(), 2);
        assert_eq!(view.dimension.rows, 4);
        let csv = service.csv(&filter).await?;
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], Coin::COLUMNS.join(","));
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("bitcoin,BTC,"));
        Ok(())
    }

    #[tokio::test]
    async fn test_page_without_payload_fails() -> Result<()> {
        let (url, _) = serve_page("<html><body>maintenance</body></html>".to_string()).await?;
        let service = MarketService::new(url, CachePolicy::Process)?;
        assert!(service.listing(QuoteUnit::Usd).await.is_err());
        Ok(())
    }
}
