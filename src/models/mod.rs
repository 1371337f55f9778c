//! Data models for Libris

pub mod author;
pub mod book;
pub mod category;
pub mod library;
pub mod pagination;
pub mod reference;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorResponse, AuthorSummary};
pub use book::{Book, BookResponse, BookWithAuthor};
pub use category::{Category, CategoryResponse};
pub use library::{Library, LibraryResponse};
pub use pagination::{PaginatedResponse, Pagination};
pub use reference::ObjectRef;
pub use user::{User, UserRentals, UserResponse};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation body for writes that return no entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
