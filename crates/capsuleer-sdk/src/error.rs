//! Error types for the Capsuleer SDK

use crate::auth::AuthError;
use thiserror::Error;

/// Main error type for SDK operations
#[derive(Debug, Error)]
pub enum SdkError {
    /// Authentication can no longer be renewed; the user must log in again.
    ///
    /// This is the single signal downstream code reacts to once the
    /// gateway has exhausted its one forced refresh, decoupling UI
    /// handling from the specific failure cause.
    #[error("Authentication expired - please log in again")]
    AuthenticationExpired,

    /// Token lifecycle error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The API returned an error status
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The API returned a body that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SdkError>;
