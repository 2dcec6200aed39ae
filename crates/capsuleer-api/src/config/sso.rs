//! EVE SSO (OAuth2 provider) configuration

use serde::{Deserialize, Serialize};

/// EVE SSO configuration
///
/// Client id, client secret and callback URL come from the application
/// registration at developers.eveonline.com and are required; the
/// endpoint URLs default to the live SSO/ESI endpoints and are only
/// overridden in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoConfig {
    /// OAuth client ID issued by EVE Online
    pub client_id: String,

    /// OAuth client secret issued by EVE Online
    pub client_secret: String,

    /// Registered callback URL for the authorization-code flow
    pub callback_url: String,

    /// Authorization endpoint
    pub authorize_url: String,

    /// Token endpoint (code exchange and refresh)
    pub token_url: String,

    /// Identity verification endpoint
    pub verify_url: String,

    /// User-Agent sent on verification calls, per ESI guidelines
    pub user_agent: String,
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: String::new(),
            authorize_url: "https://login.eveonline.com/v2/oauth/authorize".to_string(),
            token_url: "https://login.eveonline.com/v2/oauth/token".to_string(),
            verify_url: "https://esi.evetech.net/verify/".to_string(),
            user_agent: "Capsuleer - EVE Online companion".to_string(),
        }
    }
}
