//! Redirect dispatcher
//!
//! Decides, per completed authentication, how the token bundle reaches
//! the client: a query-string redirect to the web frontend, or a
//! custom-URL-scheme URI for native apps. Failures never surface as raw
//! error responses to the browser; they become a redirect to the
//! frontend login page with a sanitized message.

use crate::auth::state::ClientKind;
use crate::config::FrontendConfig;
use crate::error::{ApiError, Result};
use url::Url;

/// Everything a client needs after a successful login
#[derive(Debug, Clone)]
pub struct TokenBundle {
    /// Application session token
    pub session_token: String,

    /// ESI access token
    pub access_token: String,

    /// ESI refresh token
    pub refresh_token: String,

    /// Access-token lifetime in seconds
    pub expires_in: u64,
}

/// Build the post-login redirect target for the given client kind
pub fn login_success_url(
    frontend: &FrontendConfig,
    client_kind: ClientKind,
    bundle: &TokenBundle,
) -> Result<Url> {
    let mut url = match client_kind {
        ClientKind::Web => parse_frontend(&frontend.base_url)?
            .join("/auth-callback")
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to build frontend callback URL: {e}"),
            })?,
        ClientKind::Native => Url::parse(&format!("{}://callback", frontend.native_scheme))
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to build native callback URI: {e}"),
            })?,
    };

    url.query_pairs_mut()
        .append_pair("token", &bundle.session_token)
        .append_pair("eveAccessToken", &bundle.access_token)
        .append_pair("refreshToken", &bundle.refresh_token)
        .append_pair("expiresIn", &bundle.expires_in.to_string());

    Ok(url)
}

/// Build the login-error redirect target carrying a human-readable message
pub fn login_error_url(frontend: &FrontendConfig, message: &str) -> Result<Url> {
    let mut url = parse_frontend(&frontend.base_url)?
        .join("/login")
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to build login error URL: {e}"),
        })?;

    url.query_pairs_mut().append_pair("error", message);
    Ok(url)
}

fn parse_frontend(base_url: &str) -> Result<Url> {
    // The frontend base URL is validated at startup; a parse failure
    // here means the process-wide configuration was mutated out from
    // under us, which is an internal error.
    Url::parse(base_url).map_err(|e| ApiError::Internal {
        message: format!("Invalid frontend base URL: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bundle() -> TokenBundle {
        TokenBundle {
            session_token: "session-jwt".to_string(),
            access_token: "esi-access".to_string(),
            refresh_token: "esi-refresh".to_string(),
            expires_in: 1200,
        }
    }

    fn frontend() -> FrontendConfig {
        FrontendConfig {
            base_url: "https://pilot.example.net".to_string(),
            native_scheme: "eveauth-app".to_string(),
        }
    }

    #[test]
    fn test_web_redirect_shape() {
        let url = login_success_url(&frontend(), ClientKind::Web, &test_bundle()).unwrap();

        assert_eq!(url.host_str(), Some("pilot.example.net"));
        assert_eq!(url.path(), "/auth-callback");

        let query = url.query().unwrap();
        assert!(query.contains("token=session-jwt"));
        assert!(query.contains("eveAccessToken=esi-access"));
        assert!(query.contains("refreshToken=esi-refresh"));
        assert!(query.contains("expiresIn=1200"));
    }

    #[test]
    fn test_native_redirect_shape() {
        let url = login_success_url(&frontend(), ClientKind::Native, &test_bundle()).unwrap();

        assert!(url.as_str().starts_with("eveauth-app://callback?"));
        assert!(url.query().unwrap().contains("refreshToken=esi-refresh"));
    }

    #[test]
    fn test_error_redirect_carries_message() {
        let url = login_error_url(&frontend(), "Authentication failed").unwrap();

        assert_eq!(url.path(), "/login");
        assert_eq!(
            url.query_pairs().next().unwrap().1,
            "Authentication failed"
        );
    }
}
