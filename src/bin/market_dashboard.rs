use ecovault_dashboards::config::{Config, MARKET_BIND_ADDR};
use ecovault_dashboards::market_service::MarketService;
use ecovault_dashboards::models::MarketState;
use ecovault_dashboards::{init_tracing, routes};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env(MARKET_BIND_ADDR)?;
    info!("Market source {} with {:?} cache", config.market_url, config.cache_policy);
    let service = MarketService::new(config.market_url, config.cache_policy)?;
    let app = routes::market(MarketState::new(service), config.request_timeout);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Market dashboard listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
