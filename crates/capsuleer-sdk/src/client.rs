//! Authenticated ESI client
//!
//! Wraps outbound calls to the EVE ESI API, injecting the current valid
//! access token as a bearer credential. On an authorization rejection
//! it performs exactly one forced refresh and retry; if the retry also
//! fails it clears all tokens and surfaces `AuthenticationExpired`.
//! There are no further automatic retries: the gateway fails closed
//! rather than hammering the provider.

use crate::auth::AuthTokenStore;
use crate::error::{Result, SdkError};
use crate::types::{
    CharacterLocation, CharacterNotification, CharacterOnlineStatus, CharacterPlanet,
    CharacterPublicInfo, CharacterSkills, CorporationHistory, PlanetDetails, SkillQueueEntry,
    SolarSystem, TypeInfo,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default ESI base URL
pub const DEFAULT_ESI_URL: &str = "https://esi.evetech.net/latest";

/// Default image server base URL
pub const DEFAULT_IMAGE_URL: &str = "https://images.evetech.net";

/// Image variation preference, best first
const IMAGE_VARIATION_PRIORITY: &[&str] = &["render", "icon", "bp", "bpc"];

/// HTTP client for the EVE ESI API
pub struct EsiClient {
    http_client: reqwest::Client,
    base_url: String,
    image_base_url: String,
    store: Arc<AuthTokenStore>,
}

impl EsiClient {
    /// Create a client against the live ESI endpoints
    pub fn new(store: Arc<AuthTokenStore>) -> Result<Self> {
        Self::with_base_urls(store, DEFAULT_ESI_URL, DEFAULT_IMAGE_URL)
    }

    /// Create a client against custom endpoints (tests)
    pub fn with_base_urls(
        store: Arc<AuthTokenStore>,
        base_url: impl Into<String>,
        image_base_url: impl Into<String>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SdkError::HttpClient)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    // ===== Character data =====

    /// Current solar system of the character, with its name resolved
    pub async fn get_character_location(&self, character_id: i64) -> Result<SolarSystem> {
        debug!("Fetching character location");

        let location: CharacterLocation = self
            .authenticated_get(&format!("/characters/{character_id}/location/"))
            .await?;

        // System names are public data, no token needed.
        let system: serde_json::Value = self
            .public_get(&format!("/universe/systems/{}/", location.solar_system_id))
            .await?;
        let name = system["name"]
            .as_str()
            .ok_or_else(|| SdkError::InvalidResponse("System info without a name".to_string()))?
            .to_string();

        Ok(SolarSystem {
            system_id: location.solar_system_id,
            name,
        })
    }

    /// Public character information
    pub async fn get_character_public_info(
        &self,
        character_id: i64,
    ) -> Result<CharacterPublicInfo> {
        debug!("Fetching character public information");
        self.authenticated_get(&format!("/characters/{character_id}/"))
            .await
    }

    /// Corporation history, newest first (public endpoint)
    pub async fn get_character_corp_history(
        &self,
        character_id: i64,
    ) -> Result<Vec<CorporationHistory>> {
        debug!("Fetching character corporation history");
        let mut history: Vec<CorporationHistory> = self
            .public_get(&format!("/characters/{character_id}/corporationhistory/"))
            .await?;
        history.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(history)
    }

    /// Trained skills
    pub async fn get_character_skills(&self, character_id: i64) -> Result<CharacterSkills> {
        debug!("Fetching character skills");
        self.authenticated_get(&format!("/characters/{character_id}/skills/"))
            .await
    }

    /// Skill training queue
    pub async fn get_character_skill_queue(
        &self,
        character_id: i64,
    ) -> Result<Vec<SkillQueueEntry>> {
        debug!("Fetching character skill queue");
        self.authenticated_get(&format!("/characters/{character_id}/skillqueue/"))
            .await
    }

    /// Online status
    pub async fn get_character_online_status(
        &self,
        character_id: i64,
    ) -> Result<CharacterOnlineStatus> {
        debug!("Fetching character online status");
        self.authenticated_get(&format!("/characters/{character_id}/online/"))
            .await
    }

    /// Notifications, newest first
    pub async fn get_character_notifications(
        &self,
        character_id: i64,
    ) -> Result<Vec<CharacterNotification>> {
        debug!("Fetching character notifications");
        let mut notifications: Vec<CharacterNotification> = self
            .authenticated_get(&format!("/characters/{character_id}/notifications/"))
            .await?;
        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(notifications)
    }

    // ===== Planetary industry =====

    /// Planetary colonies of the character
    pub async fn get_character_planets(&self, character_id: i64) -> Result<Vec<CharacterPlanet>> {
        debug!("Fetching character planets");
        self.authenticated_get(&format!("/characters/{character_id}/planets/"))
            .await
    }

    /// Universe type information (public endpoint)
    pub async fn get_type_info(&self, type_id: i64) -> Result<TypeInfo> {
        debug!("Fetching type information for ID: {}", type_id);
        self.public_get(&format!(
            "/universe/types/{type_id}/?datasource=tranquility&language=en"
        ))
        .await
    }

    /// Full colony layout with type names resolved on pins, contents,
    /// extractor products, and routes
    pub async fn get_planet_details(
        &self,
        character_id: i64,
        planet_id: i64,
    ) -> Result<PlanetDetails> {
        debug!("Fetching planet details");

        let mut details: PlanetDetails = self
            .authenticated_get(&format!(
                "/characters/{character_id}/planets/{planet_id}/"
            ))
            .await?;

        // Collect every type id the layout references.
        let mut type_ids = HashSet::new();
        for pin in &details.pins {
            type_ids.insert(pin.type_id);
            if let Some(contents) = &pin.contents {
                for content in contents {
                    type_ids.insert(content.type_id);
                }
            }
            if let Some(extractor) = &pin.extractor_details {
                type_ids.insert(extractor.product_type_id);
            }
            if let Some(schematic_id) = pin.schematic_id {
                type_ids.insert(schematic_id);
            }
        }
        for route in &details.routes {
            type_ids.insert(route.content_type_id);
        }

        // Resolve names concurrently; a failed lookup leaves that name
        // unresolved rather than failing the whole layout.
        let lookups = type_ids.into_iter().map(|type_id| async move {
            match self.get_type_info(type_id).await {
                Ok(info) => Some((type_id, info.name)),
                Err(e) => {
                    warn!("Failed to fetch type info for ID {}: {}", type_id, e);
                    None
                }
            }
        });
        let names: HashMap<i64, String> = futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect();

        for pin in &mut details.pins {
            pin.type_name = names.get(&pin.type_id).cloned();
            if let Some(contents) = &mut pin.contents {
                for content in contents {
                    content.type_name = names.get(&content.type_id).cloned();
                }
            }
            if let Some(extractor) = &mut pin.extractor_details {
                extractor.product_type_name = names.get(&extractor.product_type_id).cloned();
            }
            pin.schematic_name = pin.schematic_id.and_then(|id| names.get(&id).cloned());
        }
        for route in &mut details.routes {
            route.content_type_name = names.get(&route.content_type_id).cloned();
        }

        Ok(details)
    }

    // ===== Images =====

    /// Available image variations for an entity
    pub async fn get_image_variations(&self, category: &str, id: i64) -> Result<Vec<String>> {
        let url = format!("{}/{category}/{id}", self.image_base_url);
        let response = self.http_client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Best image URL for an entity, falling back to the icon variation
    pub async fn get_optimal_image_url(&self, category: &str, id: i64) -> String {
        let variation = match self.get_image_variations(category, id).await {
            Ok(variations) => best_variation(&variations),
            Err(_) => "icon".to_string(),
        };
        format!("{}/{category}/{id}/{variation}", self.image_base_url)
    }

    // ===== Request plumbing =====

    /// GET with bearer auth; one forced refresh + retry on rejection
    async fn authenticated_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let token = self
            .store
            .get_valid_access_token()
            .await?
            .ok_or(SdkError::AuthenticationExpired)?;

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !is_auth_rejection(response.status()) {
            return self.handle_response(response).await;
        }

        debug!("ESI rejected the access token, forcing one refresh");
        let token = match self.store.force_refresh().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Forced refresh failed: {}", e);
                return Err(SdkError::AuthenticationExpired);
            }
        };

        let retry = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if is_auth_rejection(retry.status()) {
            // The refreshed token was rejected too; fail closed.
            self.store.clear().await?;
            return Err(SdkError::AuthenticationExpired);
        }

        self.handle_response(retry).await
    }

    /// GET without authentication (public ESI endpoints)
    async fn public_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SdkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SdkError::InvalidResponse(e.to_string()))
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

fn best_variation(variations: &[String]) -> String {
    for preferred in IMAGE_VARIATION_PRIORITY {
        if variations.iter().any(|v| v == preferred) {
            return (*preferred).to_string();
        }
    }
    variations
        .first()
        .cloned()
        .unwrap_or_else(|| "icon".to_string())
}
