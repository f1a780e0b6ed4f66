//! In-memory book store.
//!
//! Plain keyed-map CRUD with no policy beyond "exists or not". Callers are
//! expected to have been admitted by the auth gateway already.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ServiceError, ServiceResult};
use crate::types::BookId;

/// A book entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

/// Lock-guarded book map. All mutations happen under the write lock.
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<BTreeMap<BookId, Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a book under a fresh ID; any client-supplied ID is ignored.
    pub async fn create(&self, mut book: Book) -> BookId {
        let id = BookId::generate();
        book.id = id.clone();
        self.books.write().await.insert(id.clone(), book);
        id
    }

    pub async fn get(&self, id: &BookId) -> ServiceResult<Book> {
        if id.is_empty() {
            return Err(ServiceError::InvalidArgument("provide the id".to_string()));
        }
        self.books
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("book doesn't exist".to_string()))
    }

    /// Replace an existing book.
    pub async fn update(&self, book: Book) -> ServiceResult<()> {
        if book.id.is_empty() {
            return Err(ServiceError::InvalidArgument("provide the id".to_string()));
        }

        let mut books = self.books.write().await;
        match books.get_mut(&book.id) {
            Some(existing) => {
                *existing = book;
                Ok(())
            }
            None => Err(ServiceError::NotFound("book not found".to_string())),
        }
    }

    /// Remove a book. Deleting an absent ID succeeds.
    pub async fn delete(&self, id: &BookId) -> ServiceResult<bool> {
        if id.is_empty() {
            return Err(ServiceError::InvalidArgument("provide an id".to_string()));
        }
        Ok(self.books.write().await.remove(id).is_some())
    }

    /// All books, ordered by ID.
    pub async fn list(&self) -> Vec<Book> {
        self.books.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn book(title: &str) -> Book {
        Book {
            id: BookId::default(),
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            year: Some(1969),
            isbn: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = BookStore::new();
        let mut input = book("The Left Hand of Darkness");
        input.id = BookId::new("client-chosen");

        let id = store.create(input).await;
        assert_ne!(id.as_str(), "client-chosen");

        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "The Left Hand of Darkness");
    }

    #[tokio::test]
    async fn test_get_errors() {
        let store = BookStore::new();
        assert_eq!(
            store.get(&BookId::new("")).await,
            Err(ServiceError::InvalidArgument("provide the id".to_string()))
        );
        assert_eq!(
            store.get(&BookId::new("missing")).await,
            Err(ServiceError::NotFound("book doesn't exist".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update() {
        let store = BookStore::new();
        let id = store.create(book("Draft")).await;

        let mut updated = book("Final");
        updated.id = id.clone();
        store.update(updated).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().title, "Final");

        let mut ghost = book("Ghost");
        ghost.id = BookId::new("nope");
        assert_eq!(
            store.update(ghost).await,
            Err(ServiceError::NotFound("book not found".to_string()))
        );

        assert!(matches!(
            store.update(book("No id")).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = BookStore::new();
        let id = store.create(book("Gone soon")).await;

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.is_empty().await);

        assert_eq!(
            store.delete(&BookId::new("")).await,
            Err(ServiceError::InvalidArgument("provide an id".to_string()))
        );
    }

    #[tokio::test]
    async fn test_list() {
        let store = BookStore::new();
        assert!(store.list().await.is_empty());

        store.create(book("One")).await;
        store.create(book("Two")).await;

        let books = store.list().await;
        assert_eq!(books.len(), 2);
        assert!(books.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let store = Arc::new(BookStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(book(&format!("Volume {}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 32);
    }
}
