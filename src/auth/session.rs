//! Session registry: the single current token per identity.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::types::UserId;

/// Maps each identity to its one live token.
///
/// Opening a session overwrites any previous entry, so a later login
/// supersedes earlier tokens even while they are cryptographically valid.
/// Expired entries are never purged; the codec rejects them on use.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<UserId, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` as the current session for `identity` (last write wins).
    pub async fn open(&self, identity: &UserId, token: &str) {
        let previous = self
            .sessions
            .write()
            .await
            .insert(identity.clone(), token.to_string());

        if previous.is_some() {
            tracing::debug!(user_id = %identity, "previous session superseded");
        }
    }

    /// Whether `token` is the current session for `identity`.
    pub async fn is_active(&self, identity: &UserId, token: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(identity)
            .is_some_and(|current| current == token)
    }

    /// Number of identities with a recorded session.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
