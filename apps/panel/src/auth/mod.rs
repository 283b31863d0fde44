//! Cached sign-in credential. The panel only reads, clears and (after a login
//! flow elsewhere) saves it; token acquisition is not handled here.

pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Storage key shared with the extension's own storage layout.
pub const AUTH_STORAGE_KEY: &str = "ai_recruiting_agent_auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub access_token: String,
    pub id_token: String,
    /// Stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the stored credential unless it is missing, unreadable or expired.
    pub async fn load(&self) -> Result<Option<AuthToken>, StoreError> {
        let Some(value) = self.store.get(AUTH_STORAGE_KEY).await? else {
            return Ok(None);
        };
        let token: AuthToken = match serde_json::from_value(value) {
            Ok(token) => token,
            Err(e) => {
                debug!("Ignoring malformed stored credential: {e}");
                return Ok(None);
            }
        };
        if token.is_expired_at(Utc::now()) {
            debug!("Stored credential expired at {}", token.expires_at);
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// The bearer value for authenticated calls.
    pub async fn id_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.map(|t| t.id_token))
    }

    pub async fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
        self.store
            .set(AUTH_STORAGE_KEY, serde_json::to_value(token)?)
            .await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        info!("Clearing stored credential");
        self.store.remove(AUTH_STORAGE_KEY).await
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.load().await, Ok(Some(_)))
    }
}
