//! Error types for estimation and the HTTP surface.
//!
//! [`EstimateError`] is the domain taxonomy used by the core modules.
//! [`ApiError`] wraps it for the axum handlers and decides which status
//! code and message a client sees.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Job inputs failed validation.  Raised before any provider call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The vision model call itself failed.
    #[error("Provider error: {message}")]
    ProviderError {
        status: Option<u16>,
        message: String,
    },

    /// The model returned text that is not JSON.
    #[error("Failed to parse AI response: {0}")]
    UnparsableResponse(String),

    /// The model returned JSON that is not an estimate.
    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    /// Well-formed but degenerate estimate.  Resolved by the fallback
    /// estimator and never surfaced to a user.
    #[error("Could not estimate from this image")]
    UnestimatableImage,
}

impl EstimateError {
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ProviderError {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Estimate(EstimateError::InvalidInput(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Estimate(EstimateError::ProviderError { .. }) => StatusCode::BAD_GATEWAY,
            Self::Estimate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Estimate(EstimateError::InvalidInput(_)) => "INVALID_INPUT",
            Self::Estimate(EstimateError::ProviderError { .. }) => "PROVIDER_ERROR",
            Self::Estimate(EstimateError::UnparsableResponse(_)) => "UNPARSABLE_RESPONSE",
            Self::Estimate(EstimateError::MalformedResponse(_)) => "MALFORMED_RESPONSE",
            Self::Estimate(EstimateError::UnestimatableImage) => "UNESTIMATABLE_IMAGE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Estimate(EstimateError::InvalidInput(msg)) => msg.clone(),
            Self::Estimate(EstimateError::ProviderError { message, .. }) => message.clone(),
            Self::Estimate(_) => "Failed to parse AI response. Please try again.".to_string(),
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, "Internal server error"),
            Self::Estimate(EstimateError::ProviderError { status, message }) => {
                tracing::error!(?status, %message, "Vision provider failed")
            }
            _ => tracing::warn!(error = %self, "API error"),
        }

        let body = ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            error: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
