//! HTTP client for the Capsuleer backend auth endpoints

use super::types::{AuthError, AuthResult, RefreshedToken, SessionIdentity};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Client for the backend `/auth` endpoints
#[derive(Debug, Clone)]
pub struct BackendAuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendAuthClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The login URL a client navigates to in order to start the SSO flow
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }

    /// Verify a session token and resolve its identity claims
    pub async fn verify_session(&self, session_token: &str) -> AuthResult<SessionIdentity> {
        debug!("Verifying session token with backend");

        let response = self
            .client
            .get(format!("{}/auth/verify", self.base_url))
            .bearer_auth(session_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Verification request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::NotAuthenticated);
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse claims: {e}")))
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedToken> {
        debug!("Requesting access token refresh from backend");

        let response = self
            .client
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Refresh request failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshDenied(body));
        }
        if !status.is_success() {
            return Err(AuthError::NetworkError(format!(
                "Refresh failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse refresh response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url() {
        let client = BackendAuthClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.login_url(), "http://localhost:3001/auth/login");
    }
}
