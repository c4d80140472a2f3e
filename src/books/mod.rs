//! Book persistence.
//!
//! # Data Flow
//! ```text
//! handler
//!     → CrudRepository<Book> (trait object in AppState)
//!     → InMemoryBookRepository (DashMap rows + id sequence)
//! ```

pub mod model;
pub mod repository;

pub use model::{Book, NewBook};
pub use repository::{CrudRepository, Entity, InMemoryBookRepository, RepositoryError};
