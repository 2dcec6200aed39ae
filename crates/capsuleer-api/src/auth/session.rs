//! Session token codec
//!
//! Mints and verifies the application's own signed session tokens.
//! A session token is an HS256 JWT over the verified pilot identity
//! plus a snapshot of the ESI access token at mint time, with a fixed
//! validity window. Tokens are never renewed in place: after expiry a
//! new login is required.

use crate::auth::sso::IdentityClaims;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from session token verification or minting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    /// The signature does not match the configured secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The validity window has elapsed
    #[error("Token has expired")]
    Expired,

    /// The decoded content lacks required fields or is not a token at all
    #[error("Malformed token payload: {0}")]
    MalformedPayload(String),
}

/// Claims carried by a session token
///
/// Wire names match the frontend contract (`characterId`,
/// `characterName`, `accessToken`) both inside the JWT payload and in
/// the `/auth/verify` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SessionClaims {
    /// Subject: the character id as a string
    pub sub: String,

    /// Numeric EVE character id
    #[serde(rename = "characterId")]
    pub character_id: i64,

    /// Character display name
    #[serde(rename = "characterName")]
    pub character_name: String,

    /// Snapshot of the ESI access token at mint time
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Issued-at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies session tokens with a process-wide secret
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionCodec {
    /// Create a codec from the configured secret and validity window
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_hours as i64 * 3600,
        }
    }

    /// Mint a session token for a verified pilot identity
    ///
    /// The embedded access token is a snapshot: refreshing the ESI pair
    /// later does not reissue the session token.
    pub fn mint(
        &self,
        identity: &IdentityClaims,
        access_token: &str,
    ) -> Result<String, SessionTokenError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: identity.character_id.to_string(),
            character_id: identity.character_id,
            character_name: identity.character_name.clone(),
            access_token: access_token.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        debug!(
            character_id = identity.character_id,
            "Minting session token"
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::MalformedPayload(e.to_string()))
    }

    /// Verify a session token and return its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let validation = Validation::new(Algorithm::HS256);

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(SessionTokenError::Expired),
                ErrorKind::InvalidSignature => Err(SessionTokenError::InvalidSignature),
                _ => Err(SessionTokenError::MalformedPayload(e.to_string())),
            },
        }
    }
}
