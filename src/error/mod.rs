use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream API error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("No data available for {ticker}")]
    NoData { ticker: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl From<&ProxyError> for StatusCode {
    fn from(err: &ProxyError) -> Self {
        match err {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::NoData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let message = self.to_string();
        warn!("Request failed: {}", message);
        (status, Json(json!({ "error": message }))).into_response()
    }
}
