// HTTP surface for the BookStore service.
//
// Each operation is a POST route whose path is its fully-qualified name, so
// the auth gateway can key its policy on the request path.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthGateway, UserContext, auth_middleware};
use crate::error::ServiceResult;
use crate::service::{
    AuthenticationResponse, BookIdRequest, BookRequest, BookStoreService, CreateBookResponse,
    CreateUserResponse, CredentialsRequest, GetBookResponse, ListBooksResponse, SuccessResponse,
    operations,
};


pub type AppState = Arc<BookStoreService>;

/// Build the router. Every BookStore route runs behind the auth gateway;
/// `/health` does not.
pub fn create_router(state: AppState, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route(operations::CREATE_USER, post(create_user))
        .route(operations::AUTHENTICATION, post(authentication))
        .route(operations::CREATE_BOOK, post(create_book))
        .route(operations::GET_BOOK, post(get_book))
        .route(operations::UPDATE_BOOK, post(update_book))
        .route(operations::DELETE_BOOK, post(delete_book))
        .route(operations::LIST_BOOKS, post(list_books))
        .route_layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn create_user(
    State(service): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ServiceResult<(StatusCode, Json<CreateUserResponse>)> {
    let res = service.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

async fn authentication(
    State(service): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ServiceResult<Json<AuthenticationResponse>> {
    Ok(Json(service.authenticate(req).await?))
}

async fn create_book(
    State(service): State<AppState>,
    ctx: UserContext,
    Json(req): Json<BookRequest>,
) -> (StatusCode, Json<CreateBookResponse>) {
    let res = service.create_book(&ctx, req).await;
    (StatusCode::CREATED, Json(res))
}

async fn get_book(
    State(service): State<AppState>,
    ctx: UserContext,
    Json(req): Json<BookIdRequest>,
) -> ServiceResult<Json<GetBookResponse>> {
    Ok(Json(service.get_book(&ctx, req).await?))
}

async fn update_book(
    State(service): State<AppState>,
    ctx: UserContext,
    Json(req): Json<BookRequest>,
) -> ServiceResult<Json<SuccessResponse>> {
    Ok(Json(service.update_book(&ctx, req).await?))
}

async fn delete_book(
    State(service): State<AppState>,
    ctx: UserContext,
    Json(req): Json<BookIdRequest>,
) -> ServiceResult<Json<SuccessResponse>> {
    Ok(Json(service.delete_book(&ctx, req).await?))
}

// Takes no body; `{}` or nothing are both fine.
async fn list_books(State(service): State<AppState>, ctx: UserContext) -> Json<ListBooksResponse> {
    Json(service.list_books(&ctx).await)
}
