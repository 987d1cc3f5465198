//! Unified error handling for the HTTP surface.
//!
//! Every handler error maps onto a status code and a `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sim_core::SimCoreError;
use simulation::SimulationError;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown symbol or missing resource (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Operation invalid in the current lifecycle state (409).
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<SimulationError> for AppError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Precondition(msg) => AppError::Conflict(msg),
            SimulationError::Config(msg) => AppError::BadRequest(msg),
            SimulationError::Core(core) => match &core {
                SimCoreError::UnknownSymbol(_) => AppError::NotFound(core.to_string()),
                _ => AppError::BadRequest(core.to_string()),
            },
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = AppError::NotFound("unknown symbol: GOLD".into());
        assert_eq!(err.to_string(), "not found: unknown symbol: GOLD");
    }

    #[test]
    fn simulation_errors_map_to_status_classes() {
        let precondition = SimulationError::Precondition("busy".into());
        assert!(matches!(AppError::from(precondition), AppError::Conflict(_)));

        let config = SimulationError::Config("bad type".into());
        assert!(matches!(AppError::from(config), AppError::BadRequest(_)));
    }
}
