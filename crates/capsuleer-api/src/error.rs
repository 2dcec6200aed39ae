//! Error types for the Capsuleer API service

use crate::auth::session::SessionTokenError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use capsuleer_common::CapsuleerError;
use serde_json::json;
use thiserror::Error;

/// Main error type for the Capsuleer API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] capsuleer_common::ConfigurationError),

    /// Session token was rejected
    #[error("Session token error: {0}")]
    Session(#[from] SessionTokenError),

    /// Missing authentication (no token provided)
    #[error("Authentication required: {message}")]
    MissingAuthentication { message: String },

    /// The identity provider rejected a request
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Pilot identity could not be established after the token exchange
    #[error("Identity verification failed: {message}")]
    VerificationFailed { message: String },

    /// The provider no longer accepts the refresh token
    #[error("Token refresh denied: {message}")]
    RefreshDenied { message: String },

    /// HTTP client error (transient network failures included)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Invalid request
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl CapsuleerError for ApiError {}

impl ApiError {
    /// Check if error is retryable by the caller at its next natural trigger
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::HttpClient(_))
    }

    /// Sanitized single-line message, safe to hand to a browser redirect
    pub fn redirect_message(&self) -> String {
        match self {
            ApiError::Provider { message } => format!("EVE SSO rejected the login: {message}"),
            ApiError::VerificationFailed { .. } => {
                "Could not verify pilot identity with EVE SSO".to_string()
            }
            ApiError::HttpClient(_) => "EVE SSO is unreachable, please try again".to_string(),
            ApiError::BadRequest { message } => message.clone(),
            _ => "Authentication failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Wire shape follows the frontend contract: a short `error`
        // label plus an optional human-readable `message`.
        let (status, body) = match &self {
            ApiError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Configuration error" }),
            ),
            ApiError::Session(e) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid token", "message": e.to_string() }),
            ),
            ApiError::MissingAuthentication { message } => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "No token provided", "message": message }),
            ),
            ApiError::Provider { message } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Provider error", "message": message }),
            ),
            ApiError::VerificationFailed { message } => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Verification failed", "message": message }),
            ),
            ApiError::RefreshDenied { .. } => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Failed to refresh token" }),
            ),
            ApiError::HttpClient(e) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Upstream request failed", "message": e.to_string() }),
            ),
            // The message is the label itself: `{error: "No refresh
            // token provided"}`.
            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "message": message }),
            ),
            ApiError::Other(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "message": e.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Error response structure for API documentation
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Short error label
    pub error: String,

    /// Human-readable detail, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
