//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::envelope::Envelope;

/// Application error types that map to failure envelopes
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<String>,
        message: String,
    },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error; details are appended to the message
    pub fn validation(details: Vec<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message as it appears in the envelope
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { details, message } if !details.is_empty() => {
                format!("{}: {}", message, details.join("; "))
            }
            AppError::Validation { message, .. }
            | AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Unauthorized { message } => message.clone(),
            AppError::Internal(e) => format!("Server error: {:#}", e),
        }
    }

    /// Render as a failure envelope, logging the failure once
    pub fn into_envelope<T>(self) -> Envelope<T> {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc();
        let status = self.status();
        let message = self.public_message();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                %timestamp,
                error = %message,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                %timestamp,
                error = %message,
                "request rejected"
            );
        }

        Envelope::failure(status.as_u16(), message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_envelope::<()>().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_validation_error() {
        let details = vec!["Title is required".to_string()];
        let error = AppError::validation(details.clone(), "Invalid book data");

        match &error {
            AppError::Validation { details: d, message } => {
                assert_eq!(d, &details);
                assert_eq!(message, "Invalid book data");
            }
            _ => panic!("Expected Validation error"),
        }
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.public_message(), "Invalid book data: Title is required");
    }

    #[test]
    fn test_validation_without_details_keeps_message() {
        let error = AppError::validation(Vec::new(), "Invalid book data");
        assert_eq!(error.public_message(), "Invalid book data");
    }

    #[test]
    fn test_error_response_mapping() {
        let response = AppError::not_found("Resource not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::unauthorized("Book with id 3 not found").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_embeds_cause() {
        let cause: anyhow::Result<()> = Err(anyhow::anyhow!("Database connection failed"));
        let error = AppError::Internal(cause.context("loading books").unwrap_err());

        let envelope: Envelope<()> = error.into_envelope();
        assert_eq!(envelope.status_code(), 500);
        assert!(!envelope.is_success());
        assert_eq!(
            envelope.message(),
            "Server error: loading books: Database connection failed"
        );
    }

    #[test]
    fn test_envelope_keeps_payload_type() {
        let envelope: Envelope<Vec<u8>> = AppError::bad_request("Invalid Title").into_envelope();
        assert_eq!(envelope.status_code(), 400);
        assert_eq!(envelope.message(), "Invalid Title");
        assert!(envelope.data().is_none());
    }
}
