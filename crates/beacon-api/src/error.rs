use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use beacon_types::api::{ErrorResponse, ValidationDetails};

/// The API's failure taxonomy: bad input, missing row, or a store error.
/// Handlers return this and the response body falls out of `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{error}")]
    Validation {
        error: &'static str,
        details: ValidationDetails,
    },

    #[error("message not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing_fields(details: ValidationDetails) -> Self {
        ApiError::Validation {
            error: "Missing required fields",
            details,
        }
    }

    pub fn invalid_fields(details: ValidationDetails) -> Self {
        ApiError::Validation {
            error: "Invalid field values",
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { error, details } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: error.to_string(),
                    details: Some(details),
                },
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Message not found".to_string(),
                    details: None,
                },
            ),
            ApiError::Storage(err) => {
                // full error chain goes to the log, never to the caller
                error!("Storage failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".to_string(),
                        details: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
