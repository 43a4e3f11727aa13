use ecovault_dashboards::config::{Config, CREDITING_BIND_ADDR};
use ecovault_dashboards::crediting_service::CreditingService;
use ecovault_dashboards::models::CreditingState;
use ecovault_dashboards::{init_tracing, routes};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env(CREDITING_BIND_ADDR)?;
    info!("Loading workbook {}", config.workbook_path.display());
    let service = CreditingService::new(&config.workbook_path, config.conversion_mode).await?;
    let app = routes::crediting(CreditingState::new(service), config.request_timeout);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Crediting dashboard listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
