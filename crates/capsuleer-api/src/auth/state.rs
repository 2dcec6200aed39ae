//! Login state store
//!
//! Persists the anti-forgery `state` parameter (and the originating
//! client kind) across the OAuth redirect round trip. Entries are
//! single-use and expire after a fixed window, so an abandoned login
//! cannot be replayed later.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use dashmap::DashMap;
use rand::Rng;
use std::time::{Duration, Instant};

/// How long a pending login may sit between redirect and callback
const LOGIN_STATE_TTL: Duration = Duration::from_secs(600);

/// How the token bundle is delivered after login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Web frontend: query-string redirect to the configured frontend URL
    Web,

    /// Native app: custom-URL-scheme redirect
    Native,
}

impl ClientKind {
    /// Map the `platform` request hint to a client kind; default is web
    pub fn from_platform(platform: Option<&str>) -> Self {
        match platform {
            Some("mobile") | Some("native") => ClientKind::Native,
            _ => ClientKind::Web,
        }
    }
}

#[derive(Debug)]
struct PendingLogin {
    client_kind: ClientKind,
    created_at: Instant,
}

/// In-memory store of pending login attempts keyed by `state`
pub struct LoginStateStore {
    entries: DashMap<String, PendingLogin>,
    ttl: Duration,
}

impl Default for LoginStateStore {
    fn default() -> Self {
        Self::new(LOGIN_STATE_TTL)
    }
}

impl LoginStateStore {
    /// Create a store with a custom entry lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Begin a login attempt: mint a fresh state value and remember the
    /// client kind until the callback arrives
    pub fn begin(&self, client_kind: ClientKind) -> String {
        // Sweep abandoned attempts so the map cannot grow unbounded.
        self.entries
            .retain(|_, pending| pending.created_at.elapsed() < self.ttl);

        let state = random_state();
        self.entries.insert(
            state.clone(),
            PendingLogin {
                client_kind,
                created_at: Instant::now(),
            },
        );
        state
    }

    /// Consume a state value, returning the client kind it was created
    /// with. Unknown, already-used, and expired states all yield `None`.
    pub fn take(&self, state: &str) -> Option<ClientKind> {
        let (_, pending) = self.entries.remove(state)?;
        if pending.created_at.elapsed() >= self.ttl {
            return None;
        }
        Some(pending.client_kind)
    }
}

/// Generate a URL-safe random state value
fn random_state() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
