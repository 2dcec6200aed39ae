//! Authentication route handlers
//!
//! The callback handler is the one genuine state transition of the
//! login flow: token exchange, then identity verification, then session
//! minting, strictly in that order. Every failure on that path becomes
//! a sanitized redirect to the frontend login page rather than an error
//! response to the browser.

use crate::{
    api::types::{CallbackQuery, LoginQuery, RefreshRequest, RefreshResponse},
    auth::{redirect, ClientKind, SessionClaims, TokenBundle},
    config::FrontendConfig,
    error::{ApiError, Result},
    server::AppState,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info, warn};

/// Begin the EVE SSO login flow
#[utoipa::path(
    get,
    path = "/auth/login",
    params(
        ("platform" = Option<String>, Query, description = "Client platform hint: web (default) or mobile"),
    ),
    responses(
        (status = 302, description = "Redirect to the EVE SSO authorization page"),
    ),
    tag = "auth",
)]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let client_kind = ClientKind::from_platform(query.platform.as_deref());
    let login_state = state.login_states.begin(client_kind);

    debug!(?client_kind, "Beginning SSO login");

    match state.sso.authorization_url(&login_state) {
        Ok(url) => found(url.as_str()),
        Err(e) => error_redirect(&state.config.frontend, &e),
    }
}

/// Complete the EVE SSO login flow
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from the SSO"),
        ("state" = Option<String>, Query, description = "Anti-forgery state issued at login"),
        ("error" = Option<String>, Query, description = "Provider error code, when the SSO denied the request"),
    ),
    responses(
        (status = 302, description = "Redirect delivering the token bundle, or to the login page with an error message"),
    ),
    tag = "auth",
)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let frontend = &state.config.frontend;

    // The state must match a pending login started by us; this also
    // recovers the client kind chosen at login time.
    let client_kind = match query.state.as_deref().and_then(|s| state.login_states.take(s)) {
        Some(kind) => kind,
        None => {
            warn!("Callback with unknown or expired state parameter");
            return sanitized_redirect(frontend, "Invalid or expired login state");
        }
    };

    if let Some(error) = query.error {
        let reason = query.error_description.unwrap_or(error);
        warn!("EVE SSO denied the login: {}", reason);
        return error_redirect(
            frontend,
            &ApiError::Provider { message: reason },
        );
    }

    let code = match query.code {
        Some(code) => code,
        None => return sanitized_redirect(frontend, "Missing authorization code"),
    };

    match complete_login(&state, &code).await {
        Ok(bundle) => match redirect::login_success_url(frontend, client_kind, &bundle) {
            Ok(url) => found(url.as_str()),
            Err(e) => error_redirect(frontend, &e),
        },
        Err(e) => {
            warn!("Authentication callback failed: {}", e);
            error_redirect(frontend, &e)
        }
    }
}

/// Exchange the code, verify the pilot, and mint the session token.
///
/// Verification and minting are strictly sequential: the session token
/// embeds claims that are only trusted immediately after the verify
/// call tied to this exchange.
async fn complete_login(state: &AppState, code: &str) -> Result<TokenBundle> {
    let pair = state.sso.exchange_code(code).await?;
    let identity = state.sso.verify_identity(&pair.access_token).await?;
    let session_token = state.sessions.mint(&identity, &pair.access_token)?;

    info!(
        character_id = identity.character_id,
        character_name = %identity.character_name,
        "Login completed"
    );

    Ok(TokenBundle {
        session_token,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
    })
}

/// Verify a session token and return its claims
#[utoipa::path(
    get,
    path = "/auth/verify",
    responses(
        (status = 200, description = "Decoded identity claims", body = SessionClaims),
        (status = 401, description = "Missing, invalid, or expired session token", body = crate::error::ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionClaims>> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::MissingAuthentication {
        message: "Authorization header with a Bearer token is required".to_string(),
    })?;

    let claims = state.sessions.verify(token)?;

    debug!(
        character_id = claims.character_id,
        character_name = %claims.character_name,
        "Session token verified"
    );

    Ok(Json(claims))
}

/// Refresh an ESI access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Fresh access token", body = RefreshResponse),
        (status = 400, description = "No refresh token provided", body = crate::error::ErrorResponse),
        (status = 401, description = "The SSO no longer accepts the refresh token", body = crate::error::ErrorResponse),
    ),
    tag = "auth",
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let refresh_token = request
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest {
            message: "No refresh token provided".to_string(),
        })?;

    let grant = state.sso.refresh(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: grant.access_token,
        expires_in: grant.expires_in,
    }))
}

/// Extract the bearer token from an Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Plain 302 redirect; axum's `Redirect` uses 303/307, the frontend
/// contract is a 302
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Redirect to the frontend login page with the error's sanitized message
fn error_redirect(frontend: &FrontendConfig, error: &ApiError) -> Response {
    sanitized_redirect(frontend, &error.redirect_message())
}

fn sanitized_redirect(frontend: &FrontendConfig, message: &str) -> Response {
    match redirect::login_error_url(frontend, message) {
        Ok(url) => found(url.as_str()),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_found_is_302() {
        let response = found("https://example.net/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.net/login"
        );
    }
}
