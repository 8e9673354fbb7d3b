//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; client-facing messages never leak
//! store or API internals. Every error is local to the request that caused
//! it - the process stays up and the user retries manually.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::InventoryError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An inventory operation failed.
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Bad request from the client (malformed upload, missing field).
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Inventory(
                InventoryError::Store(_)
                    | InventoryError::Classification(_)
                    | InventoryError::RecipeGeneration(_)
            )
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Inventory(err) => match err {
                InventoryError::InvalidName(_) => StatusCode::BAD_REQUEST,
                InventoryError::EmptyInventory => StatusCode::CONFLICT,
                InventoryError::Store(_)
                | InventoryError::Classification(_)
                | InventoryError::RecipeGeneration(_) => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose store or API internals to clients
        let message = match &self {
            Self::Inventory(err) => match err {
                InventoryError::InvalidName(e) => e.to_string(),
                InventoryError::EmptyInventory => {
                    "The pantry is empty - add some items first".to_string()
                }
                InventoryError::Store(_) => {
                    "The inventory store is unavailable, please try again".to_string()
                }
                InventoryError::Classification(_) => {
                    "Could not classify the image, please try again".to_string()
                }
                InventoryError::RecipeGeneration(_) => {
                    "Could not generate a recipe, please try again".to_string()
                }
            },
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
