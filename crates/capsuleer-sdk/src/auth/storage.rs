//! Durable token storage
//!
//! Clients persist four plain string values: the session token, the
//! ESI access and refresh tokens, and the absolute access-token expiry.
//! The storage backend is injected so the expiry logic can be tested
//! against plain memory, while real clients use the file backend.

use super::types::{AuthError, AuthResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;

/// Storage keys for the persisted token values
pub mod keys {
    /// Application session token
    pub const SESSION_TOKEN: &str = "eve_auth_token";

    /// ESI access token
    pub const ACCESS_TOKEN: &str = "eve_access_token";

    /// ESI refresh token
    pub const REFRESH_TOKEN: &str = "eve_refresh_token";

    /// Absolute access-token expiry, milliseconds since the Unix epoch
    pub const EXPIRES_AT: &str = "eve_token_expires_at";

    /// All keys, in teardown order
    pub const ALL: &[&str] = &[SESSION_TOKEN, ACCESS_TOKEN, REFRESH_TOKEN, EXPIRES_AT];
}

/// Key/value storage for token material
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Read a stored value
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Write a value
    async fn set(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Remove a value; removing an absent key is not an error
    async fn remove(&self, key: &str) -> AuthResult<()>;
}

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// File-backed storage: one file per key under a directory
#[derive(Debug)]
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    /// Create a store rooted at the given directory, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> AuthResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            AuthError::StorageError(format!("Failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::StorageError(format!(
                "Failed to read {key}: {e}"
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| AuthError::StorageError(format!("Failed to write {key}: {e}")))
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::StorageError(format!(
                "Failed to remove {key}: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryTokenStorage::new();

        assert_eq!(storage.get(keys::SESSION_TOKEN).await.unwrap(), None);

        storage.set(keys::SESSION_TOKEN, "jwt").await.unwrap();
        assert_eq!(
            storage.get(keys::SESSION_TOKEN).await.unwrap(),
            Some("jwt".to_string())
        );

        storage.remove(keys::SESSION_TOKEN).await.unwrap();
        assert_eq!(storage.get(keys::SESSION_TOKEN).await.unwrap(), None);

        // Removing an absent key is fine
        storage.remove(keys::SESSION_TOKEN).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path()).unwrap();

        assert_eq!(storage.get(keys::ACCESS_TOKEN).await.unwrap(), None);

        storage.set(keys::ACCESS_TOKEN, "esi-access").await.unwrap();
        assert_eq!(
            storage.get(keys::ACCESS_TOKEN).await.unwrap(),
            Some("esi-access".to_string())
        );

        storage.remove(keys::ACCESS_TOKEN).await.unwrap();
        assert_eq!(storage.get(keys::ACCESS_TOKEN).await.unwrap(), None);
        storage.remove(keys::ACCESS_TOKEN).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = FileTokenStorage::new(dir.path()).unwrap();
            storage.set(keys::REFRESH_TOKEN, "esi-refresh").await.unwrap();
        }

        let storage = FileTokenStorage::new(dir.path()).unwrap();
        assert_eq!(
            storage.get(keys::REFRESH_TOKEN).await.unwrap(),
            Some("esi-refresh".to_string())
        );
    }
}
