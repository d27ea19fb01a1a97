//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{source_name} request timed out")]
    UpstreamTimeout { source_name: String },

    #[error("Could not fetch data from {source_name}: {detail}")]
    UpstreamUnavailable { source_name: String, detail: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout { source_name } => ApiError::UpstreamTimeout { source_name },
            UpstreamError::Unavailable {
                source_name,
                detail,
            } => ApiError::UpstreamUnavailable {
                source_name,
                detail,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ApiError::UpstreamTimeout { .. } | ApiError::UpstreamUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "External data source unavailable".to_string(),
                Some(self.to_string()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ApiError::Database(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(self.to_string()),
            ),
        };

        // Every handled error is logged with context before the response is built
        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(ErrorBody { error, details });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_map_to_503() {
        let err = ApiError::UpstreamTimeout {
            source_name: "RestCountries API".to_string(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let err = ApiError::UpstreamUnavailable {
            source_name: "Exchange Rate API".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::NotFound("Country not found".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = ApiError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
