//! Token refresh manager
//!
//! Owns the in-memory ESI token pair, tracks its expiry against an
//! injected clock, and performs silent refresh through the backend.
//! Refreshes are single-flight: concurrent callers needing a token
//! while one refresh is in flight share that one outstanding call
//! instead of issuing duplicates, which protects the refresh token
//! from first-use invalidation races at the provider.

use super::backend::BackendAuthClient;
use super::types::{AuthError, AuthResult, Clock, ExternalTokenState, RefreshedToken};
use futures::future::Shared;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// The in-flight refresh cache entry: one shared future, cleared on
/// completion or failure
type SharedRefresh = Shared<Pin<Box<dyn Future<Output = AuthResult<RefreshedToken>> + Send>>>;

/// Manages the ESI token pair with automatic single-flight refresh
pub struct RefreshManager {
    backend: Arc<BackendAuthClient>,
    clock: Arc<dyn Clock>,
    state: RwLock<Option<ExternalTokenState>>,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshManager {
    /// Create a manager with no token pair held
    pub fn new(backend: Arc<BackendAuthClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: RwLock::new(None),
            in_flight: Mutex::new(None),
        }
    }

    /// Install a freshly issued pair (post-login)
    pub async fn set_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: u64,
    ) {
        let state = ExternalTokenState::new(
            access_token.to_string(),
            Some(refresh_token.to_string()),
            expires_in_secs,
            self.clock.now_millis(),
        );
        *self.state.write().await = Some(state);
    }

    /// Restore a pair from durable storage with its absolute expiry
    pub async fn restore_pair(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at_millis: u64,
    ) {
        let state = ExternalTokenState {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(String::from),
            expires_at_millis,
        };
        *self.state.write().await = Some(state);
    }

    /// Current pair, if any
    pub async fn pair(&self) -> Option<ExternalTokenState> {
        self.state.read().await.clone()
    }

    /// Drop the pair
    pub async fn clear(&self) {
        *self.state.write().await = None;
    }

    /// Get an access token that is valid for at least the safety margin
    ///
    /// Returns `Ok(None)` when no pair (or no refresh token) is held.
    /// A failed refresh clears the pair before propagating the error: a
    /// dangling refresh token with no hope of renewal is worse than none.
    pub async fn get_valid_access_token(&self) -> AuthResult<Option<String>> {
        let refresh_token = {
            let state = self.state.read().await;
            match state.as_ref() {
                None => return Ok(None),
                Some(s) if s.is_fresh(self.clock.now_millis()) => {
                    return Ok(Some(s.access_token.clone()));
                }
                Some(s) => s.refresh_token.clone(),
            }
        };

        let Some(refresh_token) = refresh_token else {
            debug!("Access token stale and no refresh token held, dropping pair");
            self.clear().await;
            return Ok(None);
        };

        debug!("Access token expired or expiring soon, refreshing");
        match self.refresh_with(refresh_token).await {
            Ok(access_token) => Ok(Some(access_token)),
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.clear().await;
                Err(e)
            }
        }
    }

    /// Refresh unconditionally, regardless of tracked expiry
    ///
    /// Used by the API gateway when the provider rejects a token the
    /// manager still believed valid. Shares any in-flight refresh.
    pub async fn force_refresh(&self) -> AuthResult<String> {
        let refresh_token = self
            .state
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(AuthError::NotAuthenticated)?;

        match self.refresh_with(refresh_token).await {
            Ok(access_token) => Ok(access_token),
            Err(e) => {
                self.clear().await;
                Err(e)
            }
        }
    }

    /// Join the in-flight refresh, or start one
    async fn refresh_with(&self, refresh_token: String) -> AuthResult<String> {
        let fut = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(fut) => {
                    debug!("Joining in-flight token refresh");
                    fut.clone()
                }
                None => {
                    let backend = self.backend.clone();
                    let boxed: Pin<Box<dyn Future<Output = AuthResult<RefreshedToken>> + Send>> =
                        Box::pin(async move { backend.refresh(&refresh_token).await });
                    let fut = boxed.shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        let result = fut.clone().await;

        // Clear the cache slot, but only if it still holds the future we
        // awaited; a refresh from a later cycle may already be in flight.
        {
            let mut slot = self.in_flight.lock().await;
            if let Some(current) = slot.take() {
                if !current.ptr_eq(&fut) {
                    *slot = Some(current);
                }
            }
        }

        let grant = result?;

        // Adopt the new access token, keeping the stored refresh token:
        // the backend refresh endpoint does not rotate it.
        let mut state = self.state.write().await;
        let refresh_token = state.as_ref().and_then(|s| s.refresh_token.clone());
        *state = Some(ExternalTokenState::new(
            grant.access_token.clone(),
            refresh_token,
            grant.expires_in,
            self.clock.now_millis(),
        ));

        info!("Access token refreshed");
        Ok(grant.access_token)
    }
}
