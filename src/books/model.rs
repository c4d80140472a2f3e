//! The Book entity.

use serde::{Deserialize, Serialize};

use crate::books::repository::Entity;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Storage-generated identifier.
    pub id: u64,
    pub title: String,
    /// Publication year.
    pub year: i32,
}

/// Payload for creating or replacing a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub year: i32,
}

impl NewBook {
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// Attach a storage identifier.
    pub fn with_id(self, id: u64) -> Book {
        Book {
            id,
            title: self.title,
            year: self.year,
        }
    }
}

impl Entity for Book {
    type Id = u64;
    type Draft = NewBook;

    fn id(&self) -> &u64 {
        &self.id
    }
}
