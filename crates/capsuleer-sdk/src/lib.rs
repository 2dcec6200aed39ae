//! Client SDK for the Capsuleer companion service
//!
//! This crate mirrors the token lifecycle on the client side:
//! - Durable token storage with pluggable backends (memory, file)
//! - Silent access-token refresh with single-flight coalescing
//! - An authenticated ESI client that retries exactly once after a
//!   forced refresh and fails closed with `AuthenticationExpired`
//!
//! # Usage
//!
//! ```rust,no_run
//! use capsuleer_sdk::auth::{AuthTokenStore, BackendAuthClient, MemoryTokenStorage};
//! use capsuleer_sdk::EsiClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> capsuleer_sdk::Result<()> {
//! let backend = Arc::new(BackendAuthClient::new("http://localhost:3001")?);
//! let storage = Arc::new(MemoryTokenStorage::new());
//! let store = Arc::new(AuthTokenStore::new(storage, backend));
//!
//! // After the auth callback delivered a token bundle:
//! store
//!     .set_tokens("session-jwt", "esi-access", "esi-refresh", 1200)
//!     .await?;
//!
//! let esi = EsiClient::new(store.clone())?;
//! let planets = esi.get_character_planets(12345).await?;
//! println!("{} colonies", planets.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::EsiClient;
pub use error::{Result, SdkError};

/// Version of the capsuleer-sdk crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
