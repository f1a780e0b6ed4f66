//! Authentication gateway for inbound calls.
//!
//! Every routed call passes through [`auth_middleware`], which consults the
//! per-operation [`PolicyTable`]. Exempt operations are dispatched without an
//! identity. Everything else must present `Authorization: Bearer <token>`
//! where the token verifies, names a registered user and is that user's
//! current session. The resolved [`UserContext`] is then attached to the
//! request for the handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::auth::context::UserContext;
use crate::auth::session::SessionRegistry;
use crate::auth::token::TokenCodec;
use crate::auth::user_store::UserStore;
use crate::error::ServiceError;
use crate::types::OperationName;

/// Access policy for a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationPolicy {
    /// Callable without a bearer token
    pub exempt: bool,
}

/// Declarative operation → policy table.
///
/// Operations without an entry are treated as protected.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<OperationName, OperationPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an operation as callable without authentication.
    pub fn exempt(mut self, operation: impl Into<OperationName>) -> Self {
        self.policies
            .insert(operation.into(), OperationPolicy { exempt: true });
        self
    }

    /// Mark an operation as requiring a valid session.
    pub fn protected(mut self, operation: impl Into<OperationName>) -> Self {
        self.policies
            .insert(operation.into(), OperationPolicy { exempt: false });
        self
    }

    /// Policy for `operation`, defaulting to protected.
    pub fn policy_for(&self, operation: &str) -> OperationPolicy {
        self.policies.get(operation).copied().unwrap_or_default()
    }

    pub fn is_exempt(&self, operation: &str) -> bool {
        self.policy_for(operation).exempt
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must split on a single space into exactly two parts, the first
/// being `Bearer` in any case.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Decides, per call, whether an operation may proceed and as whom.
pub struct AuthGateway {
    policies: PolicyTable,
    codec: TokenCodec,
    users: Arc<UserStore>,
    sessions: Arc<SessionRegistry>,
}

impl AuthGateway {
    pub fn new(
        policies: PolicyTable,
        codec: TokenCodec,
        users: Arc<UserStore>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            policies,
            codec,
            users,
            sessions,
        }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Admit or reject a call.
    ///
    /// Returns `Ok(None)` for exempt operations and `Ok(Some(ctx))` for an
    /// authenticated caller. Rejections are terminal for the call.
    pub async fn authorize(
        &self,
        operation: &OperationName,
        authorization: Option<&str>,
    ) -> Result<Option<UserContext>, ServiceError> {
        if self.policies.is_exempt(operation.as_str()) {
            return Ok(None);
        }

        let token = authorization
            .and_then(parse_bearer)
            .ok_or_else(|| ServiceError::Unauthenticated("missing token".to_string()))?;

        let identity = self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "token verification failed");
            ServiceError::Unauthenticated("invalid token".to_string())
        })?;

        if !self.users.contains(&identity).await {
            return Err(ServiceError::Unauthenticated(
                "user does not exist".to_string(),
            ));
        }

        if !self.sessions.is_active(&identity, token).await {
            return Err(ServiceError::Unauthenticated("invalid token".to_string()));
        }

        Ok(Some(UserContext::new(identity, operation.clone())))
    }
}

/// Axum middleware running [`AuthGateway::authorize`] on every routed call.
///
/// The operation name is the request path.
pub async fn auth_middleware(
    State(gateway): State<Arc<AuthGateway>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let operation = OperationName::new(request.uri().path());
    let authorization = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match gateway.authorize(&operation, authorization.as_deref()).await {
        Ok(Some(ctx)) => {
            debug!(operation = %operation, user_id = %ctx.user_id(), "call admitted");
            request.extensions_mut().insert(ctx);
        }
        Ok(None) => {
            debug!(operation = %operation, "exempt call admitted");
        }
        Err(err) => {
            warn!(operation = %operation, reason = %err, "call rejected");
            return Err(err);
        }
    }

    Ok(next.run(request).await)
}
