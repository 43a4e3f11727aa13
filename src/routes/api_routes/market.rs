use crate::market_service::MarketFilter;
use crate::models::{MarketState, QuoteUnit, Timeframe};
use crate::{AppError, Result};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    unit: Option<String>,
    coins: Option<String>,
    top: Option<usize>,
    timeframe: Option<String>,
    sort: Option<String>,
}
impl MarketQuery {
    fn into_filter(self) -> Result<MarketFilter> {
        let mut builder = MarketFilter::builder();
        if let Some(unit) = self.unit {
            builder.unit(unit.parse::<QuoteUnit>()?);
        }
        if let Some(coins) = self.coins {
            let symbols = coins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            builder.coins(symbols);
        }
        if let Some(top) = self.top {
            builder.top(top);
        }
        if let Some(timeframe) = self.timeframe {
            builder.timeframe(timeframe.parse::<Timeframe>()?);
        }
        if let Some(sort) = self.sort {
            builder.sort(parse_flag(&sort)?);
        }
        builder
            .build()
            .map_err(|e| AppError::QueryError(e.to_string()))
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        other => Err(AppError::QueryError(format!("sort: expected yes or no, got '{other}'"))),
    }
}

pub async fn market(State(state): State<MarketState>, Query(query): Query<MarketQuery>) -> impl IntoResponse {
    let result = match query.into_filter() {
        Ok(filter) => state.market_service.view(&filter).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => {
            tracing::error!("market view failed: {err}");
            err.into_response()
        }
    }
}

pub async fn csv(State(state): State<MarketState>, Query(query): Query<MarketQuery>) -> impl IntoResponse {
    let result = match query.into_filter() {
        Ok(filter) => state.market_service.csv(&filter).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(body) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "text/csv"),
                (CONTENT_DISPOSITION, "attachment; filename=\"crypto.csv\""),
            ],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("market csv failed: {err}");
            err.into_response()
        }
    }
}
