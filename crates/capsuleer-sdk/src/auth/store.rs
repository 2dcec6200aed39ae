//! Client-side token store
//!
//! The durable mirror of the token lifecycle: persists the session
//! token and ESI pair, answers "is this client authenticated", and
//! hands out valid access tokens by delegating expiry tracking to the
//! refresh manager. `clear()` is the sole teardown path, so
//! authenticated-state and pair-state cannot diverge.
//!
//! "Authenticated" means a session token is present; whether the ESI
//! pair is still refreshable is a separate, independently observable
//! question answered per API call.

use super::backend::BackendAuthClient;
use super::refresh::RefreshManager;
use super::storage::{keys, TokenStorage};
use super::types::{AuthResult, Clock, SessionIdentity, SystemClock};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Durable client-side store for the session token and ESI pair
pub struct AuthTokenStore {
    storage: Arc<dyn TokenStorage>,
    backend: Arc<BackendAuthClient>,
    refresh: RefreshManager,
    clock: Arc<dyn Clock>,
    session_token: RwLock<Option<String>>,
}

impl AuthTokenStore {
    /// Create a store over the given storage backend and auth backend
    pub fn new(storage: Arc<dyn TokenStorage>, backend: Arc<BackendAuthClient>) -> Self {
        Self::with_clock(storage, backend, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock (deterministic tests)
    pub fn with_clock(
        storage: Arc<dyn TokenStorage>,
        backend: Arc<BackendAuthClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            backend: backend.clone(),
            refresh: RefreshManager::new(backend, clock.clone()),
            clock,
            session_token: RwLock::new(None),
        }
    }

    /// Persist a full token bundle and mirror it in memory
    pub async fn set_tokens(
        &self,
        session_token: &str,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: u64,
    ) -> AuthResult<()> {
        debug!("Storing token bundle");

        let expires_at = self.clock.now_millis() + expires_in_secs * 1000;

        self.storage.set(keys::SESSION_TOKEN, session_token).await?;
        self.storage.set(keys::ACCESS_TOKEN, access_token).await?;
        self.storage.set(keys::REFRESH_TOKEN, refresh_token).await?;
        self.storage
            .set(keys::EXPIRES_AT, &expires_at.to_string())
            .await?;

        *self.session_token.write().await = Some(session_token.to_string());
        self.refresh
            .set_pair(access_token, refresh_token, expires_in_secs)
            .await;

        Ok(())
    }

    /// True iff a session token is present, in memory or durable storage
    ///
    /// Deliberately independent of whether the ESI pair is still valid.
    pub async fn is_authenticated(&self) -> bool {
        if self.session_token.read().await.is_some() {
            return true;
        }
        matches!(self.storage.get(keys::SESSION_TOKEN).await, Ok(Some(_)))
    }

    /// The stored session token, if any
    pub async fn session_token(&self) -> Option<String> {
        if let Some(token) = self.session_token.read().await.clone() {
            return Some(token);
        }
        self.storage.get(keys::SESSION_TOKEN).await.ok().flatten()
    }

    /// Remove every persisted value and in-memory mirror
    pub async fn clear(&self) -> AuthResult<()> {
        debug!("Clearing all tokens");

        *self.session_token.write().await = None;
        self.refresh.clear().await;

        for key in keys::ALL {
            self.storage.remove(key).await?;
        }
        Ok(())
    }

    /// Get an ESI access token that is valid for at least the safety margin
    ///
    /// Lazily hydrates from durable storage, then delegates the expiry
    /// check (and any silent refresh) to the refresh manager. A refresh
    /// failure tears the whole authenticated state down.
    pub async fn get_valid_access_token(&self) -> AuthResult<Option<String>> {
        self.hydrate().await?;

        let previous = self.refresh.pair().await.map(|p| p.access_token);
        match self.refresh.get_valid_access_token().await {
            Ok(Some(token)) => {
                if previous.as_deref() != Some(token.as_str()) {
                    self.persist_pair().await?;
                }
                Ok(Some(token))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Refresh failed, clearing tokens: {}", e);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Refresh unconditionally; used by the API gateway retry path
    pub async fn force_refresh(&self) -> AuthResult<String> {
        self.hydrate().await?;

        match self.refresh.force_refresh().await {
            Ok(token) => {
                self.persist_pair().await?;
                Ok(token)
            }
            Err(e) => {
                self.clear().await?;
                Err(e)
            }
        }
    }

    /// Complete a login from the callback token bundle
    ///
    /// Verifies the session token against the backend before trusting
    /// it; a failed verification tears down any partial state.
    pub async fn complete_login(
        &self,
        session_token: &str,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: u64,
    ) -> AuthResult<SessionIdentity> {
        match self.backend.verify_session(session_token).await {
            Ok(identity) => {
                self.set_tokens(session_token, access_token, refresh_token, expires_in_secs)
                    .await?;
                info!(
                    character_id = identity.character_id,
                    character_name = %identity.character_name,
                    "Login completed"
                );
                Ok(identity)
            }
            Err(e) => {
                warn!("Session token verification failed: {}", e);
                self.clear().await?;
                Err(e)
            }
        }
    }

    /// The URL a client navigates to in order to start a login
    pub fn login_url(&self) -> String {
        self.backend.login_url()
    }

    /// Load the ESI pair from durable storage if none is held in memory
    async fn hydrate(&self) -> AuthResult<()> {
        if self.refresh.pair().await.is_some() {
            return Ok(());
        }

        let access_token = self.storage.get(keys::ACCESS_TOKEN).await?;
        let expires_at = self.storage.get(keys::EXPIRES_AT).await?;
        let refresh_token = self.storage.get(keys::REFRESH_TOKEN).await?;

        if let (Some(access_token), Some(expires_at)) = (access_token, expires_at) {
            // An unparseable expiry means the stored pair is unusable;
            // treat it as absent rather than guessing a lifetime.
            match expires_at.parse::<u64>() {
                Ok(expires_at_millis) => {
                    debug!("Hydrated ESI pair from durable storage");
                    self.refresh
                        .restore_pair(&access_token, refresh_token.as_deref(), expires_at_millis)
                        .await;
                }
                Err(_) => warn!("Ignoring stored pair with unparseable expiry"),
            }
        }

        Ok(())
    }

    /// Write the current access token and expiry back to durable storage
    async fn persist_pair(&self) -> AuthResult<()> {
        if let Some(pair) = self.refresh.pair().await {
            self.storage
                .set(keys::ACCESS_TOKEN, &pair.access_token)
                .await?;
            self.storage
                .set(keys::EXPIRES_AT, &pair.expires_at_millis.to_string())
                .await?;
        }
        Ok(())
    }
}
