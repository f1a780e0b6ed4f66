//! Process-wide configuration for the gateway.

use std::net::SocketAddr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:9000";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// Minimal cost, for tests only.
    pub fn cheap() -> Self {
        Self {
            memory_kib: argon2::Params::MIN_M_COST.max(8),
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Authentication configuration.
///
/// Built once at startup; the signing secret is fixed for the process lifetime.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    jwt_secret: String,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
    /// Password hashing cost
    pub hash_cost: HashCost,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl AuthConfig {
    /// Create a validated config. Fails if the secret is empty or the TTL is not positive.
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64, hash_cost: HashCost) -> Result<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET is not set");
        }
        if token_ttl_hours <= 0 {
            bail!("token TTL must be positive, got {} hours", token_ttl_hours);
        }

        Ok(Self {
            jwt_secret,
            token_ttl_hours,
            hash_cost,
        })
    }

    /// Config with default TTL and cost for the given secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Result<Self> {
        Self::new(jwt_secret, DEFAULT_TOKEN_TTL_HOURS, HashCost::default())
    }

    /// Signing secret bytes.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn new(bind: &str, auth: AuthConfig) -> Result<Self> {
        let bind = bind
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address `{}`: {}", bind, e))?;
        Ok(Self { bind, auth })
    }
}
