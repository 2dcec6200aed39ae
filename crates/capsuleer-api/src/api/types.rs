//! Request and response types for the Capsuleer API
//!
//! Wire field names follow the frontend contract: camelCase on the
//! wire, snake_case in Rust.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for the login endpoint
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Client platform hint: `web` (default) or `mobile`
    pub platform: Option<String>,
}

/// Query parameters delivered by the SSO on the callback redirect
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code (success path)
    pub code: Option<String>,

    /// Anti-forgery state issued at login time
    pub state: Option<String>,

    /// Provider error code (denial path)
    pub error: Option<String>,

    /// Provider error detail
    pub error_description: Option<String>,
}

/// Body of the token refresh request
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    /// ESI refresh token
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Body of a successful token refresh response
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RefreshResponse {
    /// Fresh ESI access token
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Lifetime of the access token in seconds
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,

    /// Human-readable status message
    pub message: String,

    /// Service version
    pub version: String,

    /// ISO 8601 timestamp
    pub timestamp: DateTime<Utc>,
}
