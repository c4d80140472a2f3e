//! CRUD repository abstraction and its in-memory store.
//!
//! # Responsibilities
//! - Generic create/read/update/delete over an entity
//! - Identity generation (unique, increasing, never reused)
//!
//! # Design Decisions
//! - Lock-free: `DashMap` for rows, `AtomicU64` for the id sequence
//! - `find_all` is ordered by id so listings are stable
//! - Updates replace the whole row; the id is preserved

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use thiserror::Error;

use crate::books::model::{Book, NewBook};

/// A persisted record with an identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + Ord + Display + Debug + Send + Sync + 'static;
    /// The payload used to create or replace the entity.
    type Draft: Send;

    fn id(&self) -> &Self::Id;
}

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("entity {0} not found")]
    NotFound(String),
}

/// Create/read/update/delete over `E`.
pub trait CrudRepository<E: Entity>: Send + Sync {
    /// Persist a new entity, assigning its identifier.
    fn save(&self, draft: E::Draft) -> E;

    fn find_by_id(&self, id: E::Id) -> Option<E>;

    /// All entities ordered by identifier.
    fn find_all(&self) -> Vec<E>;

    /// Replace an existing entity.
    fn update(&self, id: E::Id, draft: E::Draft) -> Result<E, RepositoryError>;

    fn delete_by_id(&self, id: E::Id) -> Result<(), RepositoryError>;

    fn exists_by_id(&self, id: E::Id) -> bool {
        self.find_by_id(id).is_some()
    }

    fn count(&self) -> usize;
}

/// Book store held in memory.
#[derive(Debug)]
pub struct InMemoryBookRepository {
    rows: DashMap<u64, Book>,
    next_id: AtomicU64,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a repository pre-populated with `books`.
    pub fn seeded(books: impl IntoIterator<Item = NewBook>) -> Self {
        let repo = Self::new();
        for book in books {
            repo.save(book);
        }
        repo
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CrudRepository<Book> for InMemoryBookRepository {
    fn save(&self, draft: NewBook) -> Book {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let book = draft.with_id(id);
        self.rows.insert(id, book.clone());
        tracing::debug!(id, title = %book.title, "Book saved");
        book
    }

    fn find_by_id(&self, id: u64) -> Option<Book> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    fn find_all(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.rows.iter().map(|row| row.value().clone()).collect();
        books.sort_by_key(|b| *b.id());
        books
    }

    fn update(&self, id: u64, draft: NewBook) -> Result<Book, RepositoryError> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        *row = draft.with_id(id);
        Ok(row.clone())
    }

    fn delete_by_id(&self, id: u64) -> Result<(), RepositoryError> {
        self.rows
            .remove(&id)
            .map(|_| tracing::debug!(id, "Book deleted"))
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn count(&self) -> usize {
        self.rows.len()
    }
}
