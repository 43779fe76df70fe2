use std::sync::Arc;

use pabrik_kv::KVStore;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Local-state key holding a token override.
pub const TOKEN_KEY: &str = "auth:directus_token";

/// Pluggable token provider. Called before every API request.
///
/// Returns `Ok(None)` to skip the Authorization header (anonymous).
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication: anonymous requests.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Static bearer token (already obtained externally).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// Token read from local state on every call, falling back to a configured
/// token when nothing is stored. Storing a token with [`StoredToken::save`]
/// takes effect on the next request without rebuilding the client.
pub struct StoredToken {
    store: Arc<dyn KVStore>,
    fallback: Option<String>,
}

impl StoredToken {
    pub fn new(store: Arc<dyn KVStore>, fallback: Option<String>) -> Self {
        Self { store, fallback }
    }

    /// Persist a token override.
    pub fn save(store: &dyn KVStore, token: &str) -> Result<(), pabrik_kv::KVError> {
        store.set(TOKEN_KEY, token.as_bytes())
    }

    /// Remove the override so the fallback applies again.
    pub fn clear(store: &dyn KVStore) -> Result<(), pabrik_kv::KVError> {
        store.delete(TOKEN_KEY)
    }

    fn stored(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read stored token, using fallback");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for StoredToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        if let Some(token) = self.stored() {
            debug!("using stored token");
            return Ok(Some(token));
        }
        debug!(fallback = self.fallback.is_some(), "no stored token");
        Ok(self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pabrik_kv::MemoryStore;

    #[tokio::test]
    async fn no_auth_returns_none() {
        let ts = NoAuth;
        assert!(ts.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("my-token");
        assert_eq!(ts.token().await.unwrap(), Some("my-token".to_string()));
    }

    #[tokio::test]
    async fn stored_token_overrides_fallback() {
        let store = Arc::new(MemoryStore::new());
        let ts = StoredToken::new(store.clone(), Some("fallback".into()));
        assert_eq!(ts.token().await.unwrap().as_deref(), Some("fallback"));

        StoredToken::save(store.as_ref(), "override").unwrap();
        assert_eq!(ts.token().await.unwrap().as_deref(), Some("override"));

        StoredToken::clear(store.as_ref()).unwrap();
        assert_eq!(ts.token().await.unwrap().as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn blank_stored_token_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        StoredToken::save(store.as_ref(), "   ").unwrap();
        let ts = StoredToken::new(store, None);
        assert_eq!(ts.token().await.unwrap(), None);
    }
}
