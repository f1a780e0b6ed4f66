//! The BookStore service: signup, login and book CRUD.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{PolicyTable, SessionRegistry, TokenCodec, UserContext, UserStore};
use crate::books::{Book, BookStore};
use crate::config::AuthConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{BookId, UserId, Username};

/// Fully-qualified operation names. Each is also the HTTP route path.
pub mod operations {
    pub const CREATE_USER: &str = "/BookStore/CreateUser";
    pub const AUTHENTICATION: &str = "/BookStore/Authentication";
    pub const CREATE_BOOK: &str = "/BookStore/CreateBook";
    pub const GET_BOOK: &str = "/BookStore/GetBook";
    pub const UPDATE_BOOK: &str = "/BookStore/UpdateBook";
    pub const DELETE_BOOK: &str = "/BookStore/DeleteBook";
    pub const LIST_BOOKS: &str = "/BookStore/ListBooks";
}

/// Access policy for every BookStore operation.
pub fn policy_table() -> PolicyTable {
    use self::operations::*;

    PolicyTable::new()
        .exempt(CREATE_USER)
        .exempt(AUTHENTICATION)
        .protected(CREATE_BOOK)
        .protected(GET_BOOK)
        .protected(UPDATE_BOOK)
        .protected(DELETE_BOOK)
        .protected(LIST_BOOKS)
}

#[derive(Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserResponse {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub book: Book,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookIdRequest {
    #[serde(default)]
    pub id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookResponse {
    pub id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetBookResponse {
    pub book: Book,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListBooksResponse {
    pub books: Vec<Book>,
}

/// Owns the user directory, session table, token codec and book store.
pub struct BookStoreService {
    users: Arc<UserStore>,
    sessions: Arc<SessionRegistry>,
    codec: TokenCodec,
    books: BookStore,
}

impl BookStoreService {
    pub fn new(config: &AuthConfig) -> ServiceResult<Self> {
        Ok(Self {
            users: Arc::new(UserStore::new(config.hash_cost)?),
            sessions: Arc::new(SessionRegistry::new()),
            codec: TokenCodec::new(config),
            books: BookStore::new(),
        })
    }

    pub fn users(&self) -> &Arc<UserStore> {
        &self.users
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a user. Exempt from authentication.
    pub async fn create_user(&self, req: CredentialsRequest) -> ServiceResult<CreateUserResponse> {
        if req.username.is_empty() {
            return Err(ServiceError::InvalidArgument("provide a username".to_string()));
        }
        let user_id = self
            .users
            .register(&Username::new(req.username), &req.password)
            .await?;
        Ok(CreateUserResponse { user_id })
    }

    /// Log in and open a new session, retiring any previous token.
    pub async fn authenticate(
        &self,
        req: CredentialsRequest,
    ) -> ServiceResult<AuthenticationResponse> {
        let identity = self
            .users
            .verify_credentials(&Username::new(req.username), &req.password)
            .await?;

        let token = self.codec.issue(&identity)?;
        self.sessions.open(&identity, &token).await;

        info!(user_id = %identity, "user logged in");
        Ok(AuthenticationResponse { token })
    }

    pub async fn create_book(&self, ctx: &UserContext, req: BookRequest) -> CreateBookResponse {
        let id = self.books.create(req.book).await;
        info!(user_id = %ctx.user_id(), book_id = %id, "book created");
        CreateBookResponse { id }
    }

    pub async fn get_book(
        &self,
        ctx: &UserContext,
        req: BookIdRequest,
    ) -> ServiceResult<GetBookResponse> {
        let book = self.books.get(&req.id).await?;
        tracing::debug!(user_id = %ctx.user_id(), book_id = %req.id, "book fetched");
        Ok(GetBookResponse { book })
    }

    pub async fn update_book(
        &self,
        ctx: &UserContext,
        req: BookRequest,
    ) -> ServiceResult<SuccessResponse> {
        let id = req.book.id.clone();
        self.books.update(req.book).await?;
        info!(user_id = %ctx.user_id(), book_id = %id, "book updated");
        Ok(SuccessResponse { success: true })
    }

    pub async fn delete_book(
        &self,
        ctx: &UserContext,
        req: BookIdRequest,
    ) -> ServiceResult<SuccessResponse> {
        let existed = self.books.delete(&req.id).await?;
        info!(user_id = %ctx.user_id(), book_id = %req.id, existed, "book deleted");
        Ok(SuccessResponse { success: true })
    }

    pub async fn list_books(&self, ctx: &UserContext) -> ListBooksResponse {
        let books = self.books.list().await;
        tracing::debug!(user_id = %ctx.user_id(), count = books.len(), "books listed");
        ListBooksResponse { books }
    }
}
