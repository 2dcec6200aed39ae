//! Frontend redirect configuration

use serde::{Deserialize, Serialize};

/// Frontend redirect configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Base URL of the web frontend that receives the token bundle
    pub base_url: String,

    /// Custom URL scheme used to deliver tokens to native clients
    pub native_scheme: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            native_scheme: "eveauth-app".to_string(),
        }
    }
}
