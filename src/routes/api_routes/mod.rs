use crate::models::{CreditingState, MarketState};
use axum::routing::get;
use axum::Router;

mod crediting;
mod market;

pub fn crediting(state: CreditingState) -> Router {
    Router::new()
        .route("/pages", get(crediting::pages))
        .route("/pages/{page}", get(crediting::page))
        .with_state(state)
}

pub fn market(state: MarketState) -> Router {
    Router::new()
        .route("/market", get(market::market))
        .route("/market/csv", get(market::csv))
        .with_state(state)
}
