//! Shared handler state.

use std::sync::Arc;

use crate::books::{Book, CrudRepository, InMemoryBookRepository, NewBook};

/// State handed to every case of the application's match block.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn CrudRepository<Book>>,
}

impl AppState {
    pub fn new(books: Arc<dyn CrudRepository<Book>>) -> Self {
        Self { books }
    }

    /// State backed by an in-memory store holding `seed`.
    pub fn in_memory(seed: impl IntoIterator<Item = NewBook>) -> Self {
        Self::new(Arc::new(InMemoryBookRepository::seeded(seed)))
    }
}
