//! User context for request-scoped identity.

use axum::extract::FromRequestParts;
use http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::types::{OperationName, UserId};

/// Identity resolved by the gateway for one admitted call.
///
/// The gateway stores it in the request extensions; handlers take it as an
/// extractor. Handlers never see the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Identity of the caller
    user_id: UserId,
    /// Operation the caller was admitted to
    operation: OperationName,
}

impl UserContext {
    pub fn new(user_id: UserId, operation: OperationName) -> Self {
        Self { user_id, operation }
    }

    /// Get the caller's identity.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the operation this context was resolved for.
    pub fn operation(&self) -> &OperationName {
        &self.operation
    }
}

impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserContext>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthenticated("missing identity".to_string()))
    }
}
