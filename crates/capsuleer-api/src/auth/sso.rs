//! EVE SSO client
//!
//! Drives the OAuth2 authorization-code flow against the EVE Online
//! single sign-on: building the authorization redirect, exchanging the
//! code for an access/refresh token pair, resolving the pilot identity
//! through the verification endpoint, and refreshing access tokens.

use crate::config::SsoConfig;
use crate::error::{ApiError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Access-token lifetime assumed when the provider omits `expires_in`
pub const DEFAULT_EXPIRES_IN: u64 = 1200;

/// ESI scopes requested on every login.
///
/// The list is fixed: scopes are enumerated at application registration
/// time and the SSO rejects requests for scopes the app is not
/// registered for.
pub const ESI_SCOPES: &[&str] = &[
    "publicData",
    "esi-calendar.read_calendar_events.v1",
    "esi-location.read_location.v1",
    "esi-location.read_ship_type.v1",
    "esi-skills.read_skills.v1",
    "esi-skills.read_skillqueue.v1",
    "esi-wallet.read_character_wallet.v1",
    "esi-wallet.read_corporation_wallet.v1",
    "esi-clones.read_clones.v1",
    "esi-characters.read_contacts.v1",
    "esi-universe.read_structures.v1",
    "esi-bookmarks.read_character_bookmarks.v1",
    "esi-killmails.read_killmails.v1",
    "esi-corporations.read_corporation_membership.v1",
    "esi-assets.read_assets.v1",
    "esi-fleets.read_fleet.v1",
    "esi-fittings.read_fittings.v1",
    "esi-corporations.read_structures.v1",
    "esi-characters.read_loyalty.v1",
    "esi-characters.read_opportunities.v1",
    "esi-characters.read_chat_channels.v1",
    "esi-characters.read_medals.v1",
    "esi-characters.read_standings.v1",
    "esi-characters.read_agents_research.v1",
    "esi-industry.read_character_jobs.v1",
    "esi-markets.read_character_orders.v1",
    "esi-characters.read_blueprints.v1",
    "esi-characters.read_corporation_roles.v1",
    "esi-location.read_online.v1",
    "esi-contracts.read_character_contracts.v1",
    "esi-clones.read_implants.v1",
    "esi-characters.read_fatigue.v1",
    "esi-killmails.read_corporation_killmails.v1",
    "esi-corporations.track_members.v1",
    "esi-wallet.read_corporation_wallets.v1",
    "esi-characters.read_notifications.v1",
    "esi-corporations.read_divisions.v1",
    "esi-corporations.read_contacts.v1",
    "esi-assets.read_corporation_assets.v1",
    "esi-corporations.read_titles.v1",
    "esi-corporations.read_blueprints.v1",
    "esi-bookmarks.read_corporation_bookmarks.v1",
    "esi-contracts.read_corporation_contracts.v1",
    "esi-corporations.read_standings.v1",
    "esi-corporations.read_starbases.v1",
    "esi-industry.read_corporation_jobs.v1",
    "esi-markets.read_corporation_orders.v1",
    "esi-corporations.read_container_logs.v1",
    "esi-industry.read_character_mining.v1",
    "esi-industry.read_corporation_mining.v1",
    "esi-planets.read_customs_offices.v1",
    "esi-corporations.read_facilities.v1",
    "esi-corporations.read_medals.v1",
    "esi-characters.read_titles.v1",
    "esi-alliances.read_contacts.v1",
    "esi-characters.read_fw_stats.v1",
    "esi-corporations.read_fw_stats.v1",
    "esi-characterstats.read.v1",
];

/// Verified pilot identity resolved from the SSO verification endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Numeric EVE character id
    pub character_id: i64,

    /// Character display name
    pub character_name: String,
}

/// Access/refresh token pair issued by the SSO
#[derive(Debug, Clone)]
pub struct ExternalTokenPair {
    /// Access token for ESI requests
    pub access_token: String,

    /// Refresh token for silent renewal
    pub refresh_token: String,

    /// Access-token lifetime in seconds
    pub expires_in: u64,
}

/// A refreshed access token (the refresh token itself is unchanged)
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    /// New access token
    pub access_token: String,

    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Token response from the SSO token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN
}

/// Character data from the verification endpoint
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(rename = "CharacterID")]
    character_id: i64,
    #[serde(rename = "CharacterName")]
    character_name: String,
}

/// Client for the EVE SSO OAuth2 endpoints
pub struct SsoClient {
    config: SsoConfig,
    client: reqwest::Client,
}

impl SsoClient {
    /// Create a new SSO client from validated configuration
    pub fn new(config: SsoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(ApiError::HttpClient)?;

        Ok(Self { config, client })
    }

    /// Build the provider authorization URL for a login attempt
    ///
    /// The `state` value is the anti-forgery token; the caller persists
    /// it (with the originating client kind) across the redirect round
    /// trip via the login state store.
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.authorize_url).map_err(|e| ApiError::Internal {
            message: format!("Invalid authorize endpoint: {e}"),
        })?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("client_id", &self.config.client_id)
            .append_pair("scope", &ESI_SCOPES.join(" "))
            .append_pair("state", state);

        Ok(url)
    }

    /// Exchange an authorization code for an access/refresh token pair
    pub async fn exchange_code(&self, code: &str) -> Result<ExternalTokenPair> {
        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = provider_reason(response).await;
            warn!(%status, "Token exchange rejected by EVE SSO: {}", reason);
            return Err(ApiError::Provider { message: reason });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| ApiError::Provider {
                message: format!("Failed to parse token response: {e}"),
            })?;

        let refresh_token = token_response
            .refresh_token
            .ok_or_else(|| ApiError::Provider {
                message: "Token response contained no refresh token".to_string(),
            })?;

        Ok(ExternalTokenPair {
            access_token: token_response.access_token,
            refresh_token,
            expires_in: token_response.expires_in,
        })
    }

    /// Resolve the pilot identity for a freshly obtained access token
    ///
    /// Claims are only trusted immediately after the token exchange
    /// that produced this access token; minting must not be reordered
    /// ahead of this call.
    pub async fn verify_identity(&self, access_token: &str) -> Result<IdentityClaims> {
        debug!("Verifying pilot identity with EVE SSO");

        let response = self
            .client
            .get(&self.config.verify_url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await
            .map_err(|e| ApiError::VerificationFailed {
                message: format!("Verification request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::VerificationFailed {
                message: format!("Verification endpoint returned status {status}"),
            });
        }

        let character: VerifyResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::VerificationFailed {
                    message: format!("Failed to parse verification response: {e}"),
                })?;

        info!(
            character_id = character.character_id,
            character_name = %character.character_name,
            "Pilot identity verified"
        );

        Ok(IdentityClaims {
            character_id: character.character_id,
            character_name: character.character_name,
        })
    }

    /// Refresh an access token using the stored refresh token
    ///
    /// A provider rejection is terminal for the external session and
    /// surfaces as `RefreshDenied`; transport failures propagate as
    /// retryable HTTP client errors.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant> {
        debug!("Refreshing ESI access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = provider_reason(response).await;
            warn!(%status, "Token refresh denied by EVE SSO: {}", reason);
            return Err(ApiError::RefreshDenied { message: reason });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| ApiError::RefreshDenied {
                message: format!("Failed to parse refresh response: {e}"),
            })?;

        info!("ESI access token refreshed");

        Ok(RefreshGrant {
            access_token: token_response.access_token,
            expires_in: token_response.expires_in,
        })
    }
}

/// Extract the provider's stated reason from an error response
async fn provider_reason(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    #[derive(Deserialize)]
    struct ProviderError {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    match serde_json::from_str::<ProviderError>(&body) {
        Ok(err) => err.error_description.unwrap_or(err.error),
        Err(_) if !body.is_empty() => body,
        Err(_) => format!("status {status}"),
    }
}
