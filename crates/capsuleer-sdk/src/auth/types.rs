//! Authentication-related types and data structures
//!
//! This module defines the types used throughout the auth module:
//! the error taxonomy, the clock abstraction, and the in-memory shape
//! of the ESI token pair.

use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Safety margin before expiry at which a token is refreshed
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Authentication errors
///
/// Clonable so a single failed refresh can be observed by every caller
/// sharing the in-flight refresh future.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The backend (or the provider behind it) no longer accepts the
    /// refresh token; the current external session is over
    #[error("Token refresh denied: {0}")]
    RefreshDenied(String),

    /// Transient network failure; the caller may retry at its next
    /// natural trigger
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Durable storage failed
    #[error("Token storage error: {0}")]
    StorageError(String),

    /// The backend returned a body that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No usable credentials are held
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Wall clock abstraction
///
/// Expiry arithmetic is plain wall-clock math; injecting the clock
/// makes it deterministic under test without real timers.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// In-memory state of the ESI token pair
#[derive(Debug, Clone)]
pub struct ExternalTokenState {
    /// Current access token
    pub access_token: String,

    /// Refresh token, when one is held
    pub refresh_token: Option<String>,

    /// Absolute access-token expiry, milliseconds since the Unix epoch
    pub expires_at_millis: u64,
}

impl ExternalTokenState {
    /// Build a pair state from a provider-style relative lifetime
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: u64,
        now_millis: u64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at_millis: now_millis + expires_in_secs * 1000,
        }
    }

    /// True while the access token is more than the safety margin from expiry
    pub fn is_fresh(&self, now_millis: u64) -> bool {
        self.expires_at_millis.saturating_sub(now_millis) > REFRESH_MARGIN.as_millis() as u64
    }
}

/// A refreshed access token from the backend refresh endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    /// New access token
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Lifetime in seconds
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

/// Identity claims returned by the backend verify endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SessionIdentity {
    /// Subject: the character id as a string
    pub sub: String,

    /// Numeric EVE character id
    #[serde(rename = "characterId")]
    pub character_id: i64,

    /// Character display name
    #[serde(rename = "characterName")]
    pub character_name: String,
}
