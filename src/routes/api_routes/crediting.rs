use crate::crediting_service::pages;
use crate::models::{CreditingState, Page};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::json;

pub async fn pages() -> impl IntoResponse {
    let body = json!({
        "about": pages::ABOUT,
        "default": Page::default().to_string(),
        "pages": pages::summaries(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn page(State(state): State<CreditingState>, Path(page): Path<String>) -> impl IntoResponse {
    match page.parse::<Page>() {
        Ok(page) => (StatusCode::OK, Json(state.crediting_service.page(page))).into_response(),
        Err(err) => {
            tracing::debug!("unknown page requested: {err}");
            err.into_response()
        }
    }
}
