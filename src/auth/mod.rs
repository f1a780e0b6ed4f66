//! Authentication and access control.
//!
//! The pieces, leaves first:
//!
//! - **Password hashing**: Argon2id, salted, tunable cost
//! - **User store**: username → identity + password hash, unique usernames
//! - **Token codec**: HS256 bearer tokens carrying the identity and expiry
//! - **Session registry**: identity → the one currently valid token
//! - **Gateway**: per-call admission, injecting a [`UserContext`]
//!
//! A token is accepted only if it verifies, names a registered user, and is
//! that user's current session. Logging in again therefore retires the
//! previous token.

mod context;
mod gateway;
mod password;
mod session;
mod token;
mod user_store;

pub use context::UserContext;
pub use gateway::{AuthGateway, OperationPolicy, PolicyTable, auth_middleware, parse_bearer};
pub use password::{PasswordError, PasswordHasher};
pub use session::SessionRegistry;
pub use token::{TokenClaims, TokenCodec, TokenError};
pub use user_store::{UserRecord, UserStore};
