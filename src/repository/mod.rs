//! Repository layer: document storage and typed collections

pub mod collection;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod store;

use std::sync::Arc;

pub use collection::{Collection, Entity, Stored};
pub use filter::{Condition, Filter, Scalar};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{Document, DocumentStore, Patch, StoreError, StoreResult, UpdateOutcome};

use crate::models::{author::Author, book::Book, category::Category, library::Library, user::User};

/// Main repository struct holding one collection per entity type
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn DocumentStore>,
    pub authors: Collection<Author>,
    pub books: Collection<Book>,
    pub libraries: Collection<Library>,
    pub categories: Collection<Category>,
    pub users: Collection<User>,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            authors: Collection::new(store.clone()),
            books: Collection::new(store.clone()),
            libraries: Collection::new(store.clone()),
            categories: Collection::new(store.clone()),
            users: Collection::new(store.clone()),
            store,
        }
    }

    /// Repository backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
