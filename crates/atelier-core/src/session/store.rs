//! Session store: owns the auth token and the current user.
//!
//! Pure key/value plus one remote fetch; no orchestration logic lives here.
//! The coordinator sequences when these operations run.

use super::model::User;
use crate::api::{BackendApi, TokenSource};
use crate::error::Result;
use crate::prefs::{PreferenceStore, keys};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the auth token and current user.
///
/// The token lives in durable storage and is re-read on every access so a
/// login completed out-of-band (another window, a test harness) is picked up
/// without restarting.
pub struct SessionStore {
    api: Arc<dyn BackendApi>,
    prefs: Arc<dyn PreferenceStore>,
    user: RwLock<Option<User>>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn BackendApi>, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            api,
            prefs,
            user: RwLock::new(None),
        }
    }

    /// Reads the current token from durable storage.
    ///
    /// Empty strings are treated as absent.
    pub async fn token(&self) -> Option<String> {
        self.prefs
            .get(keys::AUTH_TOKEN)
            .await
            .filter(|t| !t.trim().is_empty())
    }

    /// Persists a freshly issued token (login/register).
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage rejects the write.
    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.prefs.set(keys::AUTH_TOKEN, token).await
    }

    /// Loads the authenticated user from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the cached user is left
    /// untouched in that case.
    pub async fn load_current_user(&self) -> Result<()> {
        let user = self.api.current_user().await?;
        *self.user.write().await = Some(user);
        Ok(())
    }

    /// Returns the cached user, if bootstrap has loaded one.
    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// Clears the session: drops the cached user and removes the token.
    ///
    /// Token removal is best-effort; a storage failure is logged and the
    /// in-memory state is cleared regardless.
    pub async fn clear(&self) {
        *self.user.write().await = None;
        if let Err(err) = self.prefs.remove(keys::AUTH_TOKEN).await {
            tracing::warn!(error = %err, "failed to remove stored auth token");
        }
    }
}

/// Token source backed directly by the preference store.
///
/// Used to wire the HTTP client before the session store exists; both read
/// the same durable key, so they can never disagree.
pub struct StoredTokenSource {
    prefs: Arc<dyn PreferenceStore>,
}

impl StoredTokenSource {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }
}

#[async_trait]
impl TokenSource for StoredTokenSource {
    async fn bearer_token(&self) -> Option<String> {
        self.prefs
            .get(keys::AUTH_TOKEN)
            .await
            .filter(|t| !t.trim().is_empty())
    }
}
