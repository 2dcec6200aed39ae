//! Authentication module for the Capsuleer API
//!
//! This module owns the token lifecycle on the server side:
//! - EVE SSO OAuth2 authorization-code flow and identity verification
//! - Session token minting and verification
//! - Anti-forgery login state tracking across the redirect round trip
//! - Redirect dispatch to web and native clients

pub mod redirect;
pub mod session;
pub mod sso;
pub mod state;

// Re-export commonly used types
pub use redirect::TokenBundle;
pub use session::{SessionClaims, SessionCodec, SessionTokenError};
pub use sso::{ExternalTokenPair, IdentityClaims, SsoClient};
pub use state::{ClientKind, LoginStateStore};
