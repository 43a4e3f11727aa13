use std::{error::Error, fmt::Display};

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum AppError {
    WorkbookError(String),
    ReqwestError(String),
    ScrapeError(String),
    JsonError(String),
    SchemaError(String),
    ConfigError(String),
    QueryError(String),
    NotFound(String),
    IoError(String),
}

pub type Result<T> = core::result::Result<T, AppError>;
impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl Error for AppError {}
impl From<calamine::Error> for AppError {
    fn from(value: calamine::Error) -> Self {
        Self::WorkbookError(value.to_string())
    }
}
impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::ReqwestError(value.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(value.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}
impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            Self::QueryError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_string())).into_response()
    }
}
