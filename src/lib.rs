// Core modules
mod books;
mod config;
mod error;
mod service;
mod types;

pub mod api;
pub mod auth;

// Re-export key types and functions
pub use auth::{AuthGateway, PolicyTable, SessionRegistry, TokenCodec, UserContext, UserStore};
pub use books::{Book, BookStore};
pub use config::{AuthConfig, DEFAULT_BIND, DEFAULT_TOKEN_TTL_HOURS, HashCost, ServerConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::{BookStoreService, operations, policy_table};
pub use types::{BookId, OperationName, UserId, Username};

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing::info;

/// Build the fully wired application router.
///
/// The gateway shares the service's user store and session registry, so a
/// login through the service is immediately visible to the gateway.
pub fn create_app(config: &AuthConfig) -> Result<Router> {
    let service = Arc::new(BookStoreService::new(config)?);
    Ok(router_for(service))
}

/// Router over an existing service, with a gateway bound to its stores.
pub fn router_for(service: Arc<BookStoreService>) -> Router {
    let gateway = Arc::new(AuthGateway::new(
        policy_table(),
        service.codec().clone(),
        service.users().clone(),
        service.sessions().clone(),
    ));

    api::create_router(service, gateway)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let app = create_app(&config.auth)?;
    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    info!("BookStore server listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
