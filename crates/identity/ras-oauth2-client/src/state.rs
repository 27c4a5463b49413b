//! Anti-forgery state tracking between the authorization redirect and the callback.

use crate::error::{OAuth2Error, OAuth2Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A pending authorization request, keyed by its `state` value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2State {
    pub state: String,
    pub provider_id: String,
    pub redirect_uri: String,
    pub code_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OAuth2State {
    pub fn new(
        provider_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        code_verifier: Option<String>,
        ttl_seconds: u64,
    ) -> Self {
        Self::with_state(
            Self::random_state(),
            provider_id,
            redirect_uri,
            code_verifier,
            ttl_seconds,
        )
    }

    /// Track a caller-chosen state value instead of a random one.
    pub fn with_state(
        state: impl Into<String>,
        provider_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        code_verifier: Option<String>,
        ttl_seconds: u64,
    ) -> Self {
        let created_at = Utc::now();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = Duration::try_seconds(ttl)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            state: state.into(),
            provider_id: provider_id.into(),
            redirect_uri: redirect_uri.into(),
            code_verifier,
            created_at,
            expires_at,
        }
    }

    /// 32 lowercase hex characters of randomness.
    pub fn random_state() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Storage for pending authorization requests
#[async_trait]
pub trait OAuth2StateStore: Send + Sync {
    async fn store(&self, state: OAuth2State) -> OAuth2Result<()>;

    /// Remove and return the entry for `state`. Each state is usable once.
    async fn retrieve(&self, state: &str) -> OAuth2Result<OAuth2State>;

    async fn cleanup_expired(&self) -> OAuth2Result<usize>;
}

#[derive(Default)]
pub struct InMemoryStateStore {
    states: Arc<RwLock<HashMap<String, OAuth2State>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl OAuth2StateStore for InMemoryStateStore {
    async fn store(&self, state: OAuth2State) -> OAuth2Result<()> {
        let mut states = self.states.write().await;
        states.insert(state.state.clone(), state);
        Ok(())
    }

    async fn retrieve(&self, state: &str) -> OAuth2Result<OAuth2State> {
        let mut states = self.states.write().await;
        let pending = states.remove(state).ok_or(OAuth2Error::StateNotFound)?;

        if pending.is_expired() {
            return Err(OAuth2Error::StateNotFound);
        }

        Ok(pending)
    }

    async fn cleanup_expired(&self) -> OAuth2Result<usize> {
        let mut states = self.states.write().await;
        let before = states.len();
        let now = Utc::now();

        states.retain(|_, pending| pending.expires_at >= now);

        Ok(before - states.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_state_shape() {
        let state = OAuth2State::random_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(state, OAuth2State::random_state());
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let store = InMemoryStateStore::new();
        let state = OAuth2State::new("disqus", "none", Some("verifier123".to_string()), 300);
        let key = state.state.clone();

        store.store(state).await.unwrap();

        let retrieved = store.retrieve(&key).await.unwrap();
        assert_eq!(retrieved.provider_id, "disqus");
        assert_eq!(retrieved.code_verifier.as_deref(), Some("verifier123"));

        let again = store.retrieve(&key).await;
        assert!(matches!(again, Err(OAuth2Error::StateNotFound)));
    }

    #[tokio::test]
    async fn test_expired_states() {
        let store = InMemoryStateStore::new();

        let mut stale = OAuth2State::with_state("stale", "disqus", "none", None, 300);
        stale.expires_at = Utc::now() - Duration::minutes(1);
        let mut also_stale = stale.clone();
        also_stale.state = "also-stale".to_string();

        store.store(stale).await.unwrap();
        store.store(also_stale).await.unwrap();
        store
            .store(OAuth2State::with_state("fresh", "disqus", "none", None, 300))
            .await
            .unwrap();

        assert!(matches!(
            store.retrieve("stale").await,
            Err(OAuth2Error::StateNotFound)
        ));
        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
    }
}
