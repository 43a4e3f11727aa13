use crate::models::{CreditingState, MarketState};
use axum::body::Body;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use http::{Method, Request, Response, StatusCode};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

mod api_routes;

pub fn crediting(state: CreditingState, timeout: Duration) -> Router {
    layered(api_routes::crediting(state), timeout)
}

pub fn market(state: MarketState, timeout: Duration) -> Router {
    layered(api_routes::market(state), timeout)
}

fn layered(api: Router, timeout: Duration) -> Router {
    let cors = CorsLayer::new().allow_methods([Method::GET]).allow_origin(Any);
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::debug_span!("http-request", method = %request.method(), uri = %request.uri())
        })
        .on_request(|_request: &Request<Body>, _span: &Span| tracing::debug!("started"))
        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
            tracing::debug!("{} in {:?}", response.status(), latency)
        })
        .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::error!("request failed: {error} after {latency:?}")
        });
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(trace)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok").into_response()
}
