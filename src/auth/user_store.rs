//! Credential store: the user directory.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::auth::password::PasswordHasher;
use crate::config::HashCost;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{UserId, Username};

/// A registered user. Immutable once created.
#[derive(Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Both indexes live under one lock so check-and-insert is atomic.
#[derive(Default)]
struct Directory {
    users: HashMap<UserId, UserRecord>,
    ids_by_username: HashMap<Username, UserId>,
}

/// User store.
///
/// Enforces username uniqueness and keeps password hashes private to the
/// store; callers only ever get an identity back.
pub struct UserStore {
    directory: RwLock<Directory>,
    hasher: Arc<PasswordHasher>,
    /// Compared against when the username is unknown, so a miss costs
    /// the same as a wrong password.
    dummy_hash: String,
}

impl UserStore {
    /// Create an empty store hashing with `cost`.
    pub fn new(cost: HashCost) -> ServiceResult<Self> {
        let hasher = PasswordHasher::new(cost)?;
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            directory: RwLock::new(Directory::default()),
            hasher: Arc::new(hasher),
            dummy_hash,
        })
    }

    /// Register a new user and return its fresh identity.
    ///
    /// Of several concurrent registrations for one username exactly one
    /// succeeds; the rest observe `AlreadyExists`.
    pub async fn register(&self, username: &Username, password: &str) -> ServiceResult<UserId> {
        if self.username_taken(username).await {
            return Err(already_exists());
        }

        let password_hash = self.hash_blocking(password).await?;

        let mut directory = self.directory.write().await;
        // Another registration may have won while we were hashing.
        if directory.ids_by_username.contains_key(username) {
            return Err(already_exists());
        }

        let id = UserId::generate();
        directory
            .ids_by_username
            .insert(username.clone(), id.clone());
        directory.users.insert(
            id.clone(),
            UserRecord {
                id: id.clone(),
                username: username.clone(),
                password_hash,
            },
        );
        drop(directory);

        info!(user_id = %id, username = %username, "user created");
        Ok(id)
    }

    /// Check a username/password pair and return the matching identity.
    ///
    /// Unknown user and wrong password fail identically.
    pub async fn verify_credentials(
        &self,
        username: &Username,
        password: &str,
    ) -> ServiceResult<UserId> {
        let candidate = {
            let directory = self.directory.read().await;
            directory
                .ids_by_username
                .get(username)
                .and_then(|id| directory.users.get(id))
                .map(|record| (record.id.clone(), record.password_hash.clone()))
        };

        let (id, stored_hash) = match candidate {
            Some((id, hash)) => (Some(id), hash),
            None => (None, self.dummy_hash.clone()),
        };

        let matches = self.verify_blocking(password, stored_hash).await?;
        match id {
            Some(id) if matches => Ok(id),
            _ => Err(ServiceError::InvalidCredentials),
        }
    }

    /// Whether `identity` belongs to a registered user.
    pub async fn contains(&self, identity: &UserId) -> bool {
        self.directory.read().await.users.contains_key(identity)
    }

    /// Look up a user by identity.
    pub async fn get_user_by_id(&self, identity: &UserId) -> Option<UserRecord> {
        self.directory.read().await.users.get(identity).cloned()
    }

    /// Look up a user by username.
    pub async fn get_user_by_username(&self, username: &Username) -> Option<UserRecord> {
        let directory = self.directory.read().await;
        directory
            .ids_by_username
            .get(username)
            .and_then(|id| directory.users.get(id))
            .cloned()
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.directory.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.directory.read().await.users.is_empty()
    }

    async fn username_taken(&self, username: &Username) -> bool {
        self.directory
            .read()
            .await
            .ids_by_username
            .contains_key(username)
    }

    async fn hash_blocking(&self, password: &str) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(ServiceError::from)
    }

    async fn verify_blocking(&self, password: &str, stored_hash: String) -> ServiceResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::Internal(format!("verification task failed: {}", e)))
    }
}

fn already_exists() -> ServiceError {
    ServiceError::AlreadyExists("username already exists".to_string())
}
