//! # Capsuleer API
//!
//! The companion auth service for EVE Online pilots.
//!
//! ## Features
//!
//! - **EVE SSO Login**: OAuth2 authorization-code flow against the EVE
//!   Online single sign-on, with anti-forgery state tracking
//! - **Session Tokens**: compact signed session tokens carrying the
//!   verified pilot identity, valid for a fixed 24-hour window
//! - **Token Refresh**: silent renewal of ESI access tokens on behalf
//!   of web and native clients
//! - **Redirect Dispatch**: delivers the token bundle to the web
//!   frontend or a native app via its custom URL scheme
//! - **OpenAPI Documentation**: auto-generated API documentation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Result};
pub use server::Server;

/// Version of the capsuleer-api crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version for API compatibility
pub const API_VERSION: &str = "v1";
