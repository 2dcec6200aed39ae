//! HTTP server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub bind_address: SocketAddr,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Origins allowed by CORS; empty allows any origin (development)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: ([0, 0, 0, 0], 3001).into(),
            request_timeout: 30,
            allowed_origins: vec![],
        }
    }
}
