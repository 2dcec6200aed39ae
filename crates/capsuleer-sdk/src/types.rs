//! ESI response types used by the Capsuleer SDK
//!
//! Field names follow ESI's snake_case wire format. `*_name` fields are
//! enrichment: absent on the wire, filled in by the client's type-name
//! resolution pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A solar system with its resolved name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarSystem {
    pub system_id: i64,
    pub name: String,
}

/// Raw response of the character location endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterLocation {
    pub solar_system_id: i64,
    pub station_id: Option<i64>,
    pub structure_id: Option<i64>,
}

/// One corporation membership record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporationHistory {
    pub corporation_id: i64,
    pub record_id: i64,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

/// Public character information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPublicInfo {
    #[serde(default)]
    pub alliance_id: Option<i64>,
    pub birthday: DateTime<Utc>,
    pub bloodline_id: i32,
    pub corporation_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub gender: String,
    pub name: String,
    pub race_id: i32,
    #[serde(default)]
    pub security_status: Option<f64>,
}

/// A trained skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: i32,
    pub trained_skill_level: i32,
    pub active_skill_level: i32,
    pub skillpoints_in_skill: i64,
}

/// Trained skills and total skill points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSkills {
    pub total_sp: i64,
    #[serde(default)]
    pub unallocated_sp: Option<i64>,
    pub skills: Vec<Skill>,
}

/// One entry of the skill training queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillQueueEntry {
    #[serde(default)]
    pub finish_date: Option<DateTime<Utc>>,
    pub finished_level: i32,
    #[serde(default)]
    pub level_end_sp: Option<i64>,
    #[serde(default)]
    pub level_start_sp: Option<i64>,
    pub queue_position: i32,
    pub skill_id: i32,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub training_start_sp: Option<i64>,
}

/// Character online status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterOnlineStatus {
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_logout: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logins: Option<i64>,
    pub online: bool,
}

/// A character notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterNotification {
    pub notification_id: i64,
    pub sender_id: i64,
    pub sender_type: String,
    #[serde(default)]
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_read: Option<bool>,
}

/// A planetary colony summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPlanet {
    pub last_update: DateTime<Utc>,
    pub num_pins: i32,
    pub owner_id: i64,
    pub planet_id: i64,
    pub planet_type: String,
    pub solar_system_id: i64,
    pub upgrade_level: i32,
}

/// Universe type information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInfo {
    pub type_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Contents held by a colony pin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinContent {
    pub amount: i64,
    pub type_id: i64,
    #[serde(default)]
    pub type_name: Option<String>,
}

/// An extractor head position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorHead {
    pub head_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Extractor configuration on a pin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorDetails {
    #[serde(default)]
    pub cycle_time: Option<i64>,
    #[serde(default)]
    pub heads: Vec<ExtractorHead>,
    pub product_type_id: i64,
    #[serde(default)]
    pub product_type_name: Option<String>,
    #[serde(default)]
    pub qty_per_cycle: Option<i64>,
}

/// A colony installation (pin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetPin {
    #[serde(default)]
    pub contents: Option<Vec<PinContent>>,
    pub latitude: f64,
    pub longitude: f64,
    pub pin_id: i64,
    pub type_id: i64,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub last_cycle_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schematic_id: Option<i64>,
    #[serde(default)]
    pub schematic_name: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub install_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extractor_details: Option<ExtractorDetails>,
}

/// A link between two pins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetLink {
    pub destination_pin_id: i64,
    pub link_level: i32,
    pub source_pin_id: i64,
}

/// A commodity route between two pins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetRoute {
    pub content_type_id: i64,
    #[serde(default)]
    pub content_type_name: Option<String>,
    pub destination_pin_id: i64,
    pub quantity: f64,
    pub route_id: i64,
    pub source_pin_id: i64,
    #[serde(default)]
    pub waypoints: Option<Vec<i64>>,
}

/// Full colony layout for one planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetDetails {
    pub links: Vec<PlanetLink>,
    pub pins: Vec<PlanetPin>,
    pub routes: Vec<PlanetRoute>,
}
