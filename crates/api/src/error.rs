//! Unified error handling for the customers API.
//!
//! Every failure leaves the service as `{"error": {"message", "code"}}`
//! (plus `fields` for missing-field errors). Internal failures are logged
//! and sent to Sentry; their details never reach the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use customers_core::{ApiErrorBody, ErrorCode, ValidationError};

use crate::services::CustomerError;

/// Application-level error type for the customers API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A customer operation failed.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// The request body is not valid JSON for this endpoint.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No route matched the request.
    #[error("Route not found")]
    RouteNotFound,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl AppError {
    /// The error code this failure is reported with.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Customer(err) => match err {
                CustomerError::InvalidId(_) => ErrorCode::InvalidInput,
                CustomerError::Validation(ValidationError::InvalidEmail(_)) => {
                    ErrorCode::InvalidEmail
                }
                CustomerError::Validation(ValidationError::MissingFields(_)) => {
                    ErrorCode::MissingRequiredFields
                }
                CustomerError::EmailTaken => ErrorCode::DuplicateEmail,
                CustomerError::NotFound(_) => ErrorCode::NotFound,
                CustomerError::Repository { .. } => ErrorCode::ServerError,
            },
            Self::InvalidBody(_) => ErrorCode::InvalidInput,
            Self::RouteNotFound => ErrorCode::RouteNotFound,
        }
    }

    fn body(&self) -> ApiErrorBody {
        let code = self.code();
        match self {
            Self::Customer(err) => match err {
                CustomerError::InvalidId(_) => ApiErrorBody::new("Invalid customer ID", code),
                CustomerError::Validation(ValidationError::InvalidEmail(_)) => {
                    ApiErrorBody::new("Invalid email format", code)
                }
                CustomerError::Validation(ValidationError::MissingFields(fields)) => {
                    ApiErrorBody::new("Missing required fields", code).with_fields(fields.clone())
                }
                CustomerError::EmailTaken => ApiErrorBody::new("Email already exists", code),
                CustomerError::NotFound(message) => ApiErrorBody::new(message.clone(), code),
                // Don't expose internal error details to clients
                CustomerError::Repository { action, .. } => ApiErrorBody::new(*action, code),
            },
            Self::InvalidBody(_) => ApiErrorBody::new("Invalid request body", code),
            Self::RouteNotFound => ApiErrorBody::new("Route not found", code),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        if code == ErrorCode::ServerError {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Customer request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}
