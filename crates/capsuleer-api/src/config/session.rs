//! Session token configuration

use serde::{Deserialize, Serialize};

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signing secret for session tokens.
    ///
    /// Mandatory, with no insecure default: `Config::validate` rejects
    /// an empty secret at startup.
    pub secret: String,

    /// Session validity window in hours
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_hours: 24,
        }
    }
}
