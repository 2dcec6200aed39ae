//! Configuration loading contract for Capsuleer components
//!
//! Each binary loads its configuration from an optional TOML file with
//! an environment-variable overlay. The concrete figment wiring lives
//! with the component; this trait fixes the loading surface so every
//! component exposes the same entry points.

use crate::error::ConfigurationError;
use std::path::{Path, PathBuf};

/// Loading contract for component configurations
pub trait ConfigLoader<T> {
    /// Load configuration from the default file location (if present)
    /// and the environment
    fn load(path: Option<PathBuf>) -> Result<T, ConfigurationError>;

    /// Load configuration from an explicit file path and the environment
    fn load_from_file(path: &Path) -> Result<T, ConfigurationError>;

    /// Re-apply environment overrides onto an already-loaded configuration
    fn apply_env_overrides(config: &mut T, prefix: &str) -> Result<(), ConfigurationError>;
}
