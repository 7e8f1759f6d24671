use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Bad coordinates or a missing/inverted time window. Raised before any
    /// provider is contacted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A provider call the request cannot do without (first page of a place
    /// search) failed.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A provider call failed in a way the pipeline can absorb (later page,
    /// directions batch). Callers normally log and continue.
    #[error("Provider degraded: {0}")]
    ProviderDegraded(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable classification exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ProviderUnavailable(_) => "provider_unavailable",
            AppError::ProviderDegraded(_) => "provider_degraded",
            AppError::CacheUnavailable(_) => "cache_unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match self {
            AppError::InvalidInput(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::ProviderUnavailable(ref e) => {
                tracing::error!("Provider unavailable: {}", e);
                (StatusCode::BAD_GATEWAY, "Upstream data provider unavailable")
            }
            AppError::ProviderDegraded(ref e) => {
                tracing::warn!("Provider degraded: {}", e);
                (StatusCode::BAD_GATEWAY, "Upstream data provider error")
            }
            AppError::CacheUnavailable(ref e) => {
                tracing::warn!("Cache error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error")
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "kind": kind,
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
