//! Integration tests for the Capsuleer SDK
//!
//! The backend and ESI are mocked with wiremock; expiry is driven by a
//! mock clock so threshold behavior is deterministic.

use capsuleer_sdk::auth::{
    AuthTokenStore, BackendAuthClient, Clock, MemoryTokenStorage, TokenStorage,
};
use capsuleer_sdk::{EsiClient, SdkError};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic clock for expiry tests
struct MockClock(AtomicU64);

impl MockClock {
    fn new(now_millis: u64) -> Self {
        Self(AtomicU64::new(now_millis))
    }

    fn advance_secs(&self, secs: u64) {
        self.0.fetch_add(secs * 1000, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

const NOW: u64 = 1_700_000_000_000;

fn store_with(
    server: &MockServer,
    storage: Arc<dyn TokenStorage>,
    clock: Arc<MockClock>,
) -> Arc<AuthTokenStore> {
    let backend = Arc::new(BackendAuthClient::new(server.uri()).unwrap());
    Arc::new(AuthTokenStore::with_clock(storage, backend, clock))
}

async fn logged_in_store(server: &MockServer) -> (Arc<AuthTokenStore>, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(server, Arc::new(MemoryTokenStorage::new()), clock.clone());
    store
        .set_tokens("session-jwt", "esi-access", "esi-refresh", 1200)
        .await
        .unwrap();
    (store, clock)
}

fn refresh_mock(access_token: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_string_contains("esi-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access_token,
            "expiresIn": 1200,
        })))
}

#[tokio::test]
async fn test_is_authenticated_lifecycle() {
    let server = MockServer::start().await;
    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, Arc::new(MemoryTokenStorage::new()), clock);

    assert!(!store.is_authenticated().await);

    store
        .set_tokens("session-jwt", "esi-access", "esi-refresh", 1200)
        .await
        .unwrap();
    assert!(store.is_authenticated().await);

    store.clear().await.unwrap();
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn test_no_tokens_yields_none() {
    let server = MockServer::start().await;
    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, Arc::new(MemoryTokenStorage::new()), clock);

    assert_eq!(store.get_valid_access_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_fresh_token_returned_without_refresh() {
    let server = MockServer::start().await;
    // Any refresh call would violate the margin contract.
    refresh_mock("never").expect(0).mount(&server).await;

    let (store, clock) = logged_in_store(&server).await;

    // Repeated calls before expires_at - 60s return the same token.
    for _ in 0..3 {
        assert_eq!(
            store.get_valid_access_token().await.unwrap().as_deref(),
            Some("esi-access")
        );
    }

    // Still inside the margin: 1200s lifetime, 61s remaining.
    clock.advance_secs(1200 - 61);
    assert_eq!(
        store.get_valid_access_token().await.unwrap().as_deref(),
        Some("esi-access")
    );
}

#[tokio::test]
async fn test_refresh_triggered_past_margin() {
    let server = MockServer::start().await;
    refresh_mock("esi-access-2").expect(1).mount(&server).await;

    let (store, clock) = logged_in_store(&server).await;

    // 50s of validity left: inside the 60s safety margin.
    clock.advance_secs(1200 - 50);
    assert_eq!(
        store.get_valid_access_token().await.unwrap().as_deref(),
        Some("esi-access-2")
    );

    // The refreshed expiry was adopted; no second refresh.
    assert_eq!(
        store.get_valid_access_token().await.unwrap().as_deref(),
        Some("esi-access-2")
    );
}

#[tokio::test]
async fn test_refreshed_token_is_persisted() {
    let server = MockServer::start().await;
    refresh_mock("esi-access-2").expect(1).mount(&server).await;

    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, storage.clone(), clock.clone());
    store
        .set_tokens("session-jwt", "esi-access", "esi-refresh", 1200)
        .await
        .unwrap();

    clock.advance_secs(1200);
    store.get_valid_access_token().await.unwrap();

    assert_eq!(
        storage.get("eve_access_token").await.unwrap().as_deref(),
        Some("esi-access-2")
    );
    let expires_at: u64 = storage
        .get("eve_token_expires_at")
        .await
        .unwrap()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(expires_at, clock.now_millis() + 1_200_000);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    // The server holds the refresh open long enough for every caller to
    // pile onto the in-flight future; expect(1) fails the test if any
    // duplicate refresh reaches the network.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({ "accessToken": "esi-access-2", "expiresIn": 1200 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (store, clock) = logged_in_store(&server).await;
    clock.advance_secs(1200);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(
            async move { store.get_valid_access_token().await },
        ));
    }

    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert_eq!(token.as_deref(), Some("esi-access-2"));
    }
}

#[tokio::test]
async fn test_refresh_denial_clears_everything() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Failed to refresh token" })),
        )
        .mount(&server)
        .await;

    let (store, clock) = logged_in_store(&server).await;
    clock.advance_secs(1200);

    // Refresh failure yields no token and tears down the whole
    // authenticated state, so the two cannot diverge.
    assert_eq!(store.get_valid_access_token().await.unwrap(), None);
    assert!(!store.is_authenticated().await);
    assert_eq!(store.session_token().await, None);
}

#[tokio::test]
async fn test_hydration_from_durable_storage() {
    let server = MockServer::start().await;
    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());

    // A previous session left tokens behind.
    storage.set("eve_auth_token", "session-jwt").await.unwrap();
    storage.set("eve_access_token", "esi-access").await.unwrap();
    storage
        .set("eve_refresh_token", "esi-refresh")
        .await
        .unwrap();
    storage
        .set("eve_token_expires_at", &(NOW + 1_200_000).to_string())
        .await
        .unwrap();

    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, storage, clock);

    assert!(store.is_authenticated().await);
    assert_eq!(
        store.get_valid_access_token().await.unwrap().as_deref(),
        Some("esi-access")
    );
}

#[tokio::test]
async fn test_complete_login_verifies_then_stores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "12345",
            "characterId": 12345,
            "characterName": "Test Pilot",
            "accessToken": "esi-access",
            "iat": 1700000000,
            "exp": 1700086400,
        })))
        .mount(&server)
        .await;

    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, Arc::new(MemoryTokenStorage::new()), clock);

    let identity = store
        .complete_login("session-jwt", "esi-access", "esi-refresh", 1200)
        .await
        .unwrap();
    assert_eq!(identity.character_id, 12345);
    assert_eq!(identity.character_name, "Test Pilot");
    assert!(store.is_authenticated().await);
}

#[tokio::test]
async fn test_complete_login_rejection_clears() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid token",
        })))
        .mount(&server)
        .await;

    let clock = Arc::new(MockClock::new(NOW));
    let store = store_with(&server, Arc::new(MemoryTokenStorage::new()), clock);

    let result = store
        .complete_login("forged-jwt", "esi-access", "esi-refresh", 1200)
        .await;
    assert!(result.is_err());
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn test_gateway_retries_once_after_forced_refresh() {
    let server = MockServer::start().await;

    // First skills call is rejected, the retry with the refreshed token
    // succeeds.
    Mock::given(method("GET"))
        .and(path("/characters/7/skills/"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/characters/7/skills/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_sp": 5000000,
            "skills": [
                {
                    "skill_id": 3300,
                    "trained_skill_level": 4,
                    "active_skill_level": 4,
                    "skillpoints_in_skill": 135765,
                }
            ],
        })))
        .mount(&server)
        .await;
    refresh_mock("esi-access-2").expect(1).mount(&server).await;

    let (store, _clock) = logged_in_store(&server).await;
    let esi = EsiClient::with_base_urls(store.clone(), server.uri(), server.uri()).unwrap();

    let skills = esi.get_character_skills(7).await.unwrap();
    assert_eq!(skills.total_sp, 5_000_000);
    assert_eq!(skills.skills.len(), 1);

    // The store now carries the refreshed token.
    assert_eq!(
        store.get_valid_access_token().await.unwrap().as_deref(),
        Some("esi-access-2")
    );
}

#[tokio::test]
async fn test_gateway_fails_closed_when_refresh_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/characters/7/skills/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Failed to refresh token" })),
        )
        .mount(&server)
        .await;

    let (store, _clock) = logged_in_store(&server).await;
    let esi = EsiClient::with_base_urls(store.clone(), server.uri(), server.uri()).unwrap();

    let result = esi.get_character_skills(7).await;
    assert!(matches!(result, Err(SdkError::AuthenticationExpired)));

    // Everything was torn down; the UI sees an unauthenticated client.
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn test_notifications_sorted_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/characters/7/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "notification_id": 1,
                "sender_id": 1000125,
                "sender_type": "corporation",
                "timestamp": "2025-01-01T00:00:00Z",
                "type": "CorpBecameWarEligible",
            },
            {
                "notification_id": 2,
                "sender_id": 1000125,
                "sender_type": "corporation",
                "timestamp": "2025-06-01T00:00:00Z",
                "type": "StructureUnderAttack",
            },
        ])))
        .mount(&server)
        .await;

    let (store, _clock) = logged_in_store(&server).await;
    let esi = EsiClient::with_base_urls(store, server.uri(), server.uri()).unwrap();

    let notifications = esi.get_character_notifications(7).await.unwrap();
    assert_eq!(notifications[0].notification_id, 2);
    assert_eq!(notifications[1].notification_id, 1);
}

#[tokio::test]
async fn test_planet_details_resolves_type_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/characters/7/planets/40000042/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [
                { "destination_pin_id": 2, "link_level": 0, "source_pin_id": 1 }
            ],
            "pins": [
                {
                    "latitude": 1.2,
                    "longitude": 0.6,
                    "pin_id": 1,
                    "type_id": 2848,
                    "extractor_details": {
                        "cycle_time": 1800,
                        "heads": [ { "head_id": 0, "latitude": 1.21, "longitude": 0.61 } ],
                        "product_type_id": 2268,
                        "qty_per_cycle": 3000,
                    },
                },
                {
                    "latitude": 1.3,
                    "longitude": 0.62,
                    "pin_id": 2,
                    "type_id": 2524,
                    "contents": [ { "amount": 4200, "type_id": 2268 } ],
                },
            ],
            "routes": [
                {
                    "content_type_id": 2268,
                    "destination_pin_id": 2,
                    "quantity": 3000.0,
                    "route_id": 7,
                    "source_pin_id": 1,
                    "waypoints": [],
                }
            ],
        })))
        .mount(&server)
        .await;

    for (type_id, name) in [
        (2848, "Extractor Control Unit"),
        (2524, "Launchpad"),
        (2268, "Aqueous Liquids"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/universe/types/{type_id}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type_id": type_id,
                "name": name,
                "published": true,
                "group_id": 1026,
            })))
            .mount(&server)
            .await;
    }

    let (store, _clock) = logged_in_store(&server).await;
    let esi = EsiClient::with_base_urls(store, server.uri(), server.uri()).unwrap();

    let details = esi.get_planet_details(7, 40000042).await.unwrap();

    assert_eq!(details.pins[0].type_name.as_deref(), Some("Extractor Control Unit"));
    assert_eq!(
        details.pins[0]
            .extractor_details
            .as_ref()
            .unwrap()
            .product_type_name
            .as_deref(),
        Some("Aqueous Liquids")
    );
    assert_eq!(details.pins[1].type_name.as_deref(), Some("Launchpad"));
    assert_eq!(
        details.pins[1].contents.as_ref().unwrap()[0]
            .type_name
            .as_deref(),
        Some("Aqueous Liquids")
    );
    assert_eq!(
        details.routes[0].content_type_name.as_deref(),
        Some("Aqueous Liquids")
    );
}
