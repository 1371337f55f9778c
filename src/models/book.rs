//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::AuthorSummary;
use super::reference::{render_many, resolve, resolve_many, ObjectRef};
use crate::repository::{Entity, Filter, Patch, Scalar, Stored};

pub const LIBRARIES: &str = "libraries";

/// Book document as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub author: Option<ObjectRef>,
    #[serde(default)]
    pub category: Option<ObjectRef>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    /// Libraries holding this book
    #[serde(default)]
    pub libraries: Vec<ObjectRef>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";
    const NAME: &'static str = "Book";
}

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub isbn: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub libraries: Vec<String>,
}

impl From<Stored<Book>> for BookResponse {
    fn from(book: Stored<Book>) -> Self {
        Self {
            id: book.id.to_hex(),
            title: book.data.title,
            isbn: book.data.isbn,
            author: book.data.author.map(|r| r.to_hex()),
            category: book.data.category.map(|r| r.to_hex()),
            published_date: book.data.published_date,
            libraries: render_many(&book.data.libraries),
        }
    }
}

/// Book joined with its author; `author` is null when the reference is
/// absent or dangling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookWithAuthor {
    pub id: String,
    pub title: String,
    pub isbn: String,
    pub category: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub libraries: Vec<String>,
    pub author: Option<AuthorSummary>,
}

impl BookWithAuthor {
    pub fn new(book: Stored<Book>, author: Option<AuthorSummary>) -> Self {
        Self {
            id: book.id.to_hex(),
            title: book.data.title,
            isbn: book.data.isbn,
            category: book.data.category.map(|r| r.to_hex()),
            published_date: book.data.published_date,
            libraries: render_many(&book.data.libraries),
            author,
        }
    }
}

/// Create book request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 3, max = 100, message = "Title must be 3-100 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10-13 characters"))]
    pub isbn: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub libraries: Vec<String>,
}

impl CreateBook {
    pub fn into_entity(self) -> Book {
        Book {
            title: self.title,
            isbn: self.isbn,
            author: resolve(self.author.as_deref()),
            category: resolve(self.category.as_deref()),
            published_date: self.published_date,
            libraries: resolve_many(&self.libraries),
        }
    }
}

/// Update book request.
///
/// Changing `author` or `libraries` here does not touch the back-references
/// held by authors and libraries.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 3, max = 100, message = "Title must be 3-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 13, message = "ISBN must be 10-13 characters"))]
    pub isbn: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub author: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub published_date: Option<Option<NaiveDate>>,
    /// Replaces the whole set with its well-formed references; ignored when none are
    pub libraries: Option<Vec<String>>,
}

impl UpdateBook {
    pub fn into_patch(self) -> Patch {
        let mut patch = Patch::new();
        patch
            .set("title", self.title)
            .set("isbn", self.isbn)
            .set_reference("author", self.author)
            .set_reference("category", self.category)
            .set_date("published_date", self.published_date)
            .set_references(LIBRARIES, self.libraries);
        patch
    }
}

/// Library references to append to a book
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddLibraries {
    pub library_ids: Vec<String>,
}

/// Book list query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Author reference
    pub author: Option<String>,
    /// Reference of a library holding the book
    pub library: Option<String>,
    /// Earliest publication date (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Latest publication date (inclusive)
    pub end_date: Option<NaiveDate>,
}

impl BookQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .contains("title", self.title.as_deref())
            .reference("author", self.author.as_deref())
            .member(LIBRARIES, self.library.as_deref())
            .at_least("published_date", self.start_date.map(Scalar::Date))
            .at_most("published_date", self.end_date.map(Scalar::Date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Condition;
    use serde_json::json;

    #[test]
    fn test_query_filter_composition() {
        let query = BookQuery {
            title: Some("Casmurro".to_string()),
            author: Some("not-valid".to_string()),
            library: Some("507f1f77bcf86cd799439011".to_string()),
            start_date: NaiveDate::from_ymd_opt(1890, 1, 1),
            ..Default::default()
        };
        let filter = query.to_filter();
        assert_eq!(filter.conditions().len(), 3);
        assert!(matches!(filter.conditions()[0], Condition::Contains { field: "title", .. }));
        assert!(matches!(filter.conditions()[1], Condition::HasMember { field: "libraries", .. }));
        assert!(matches!(filter.conditions()[2], Condition::AtLeast { field: "published_date", .. }));
    }

    #[test]
    fn test_update_libraries_replaces_with_valid_subset() {
        let update: UpdateBook = serde_json::from_value(json!({
            "libraries": ["507f1f77bcf86cd799439011", "x"],
            "author": null
        }))
        .unwrap();
        let patch = update.into_patch();
        assert_eq!(patch.get("libraries"), Some(&json!(["507f1f77bcf86cd799439011"])));
        assert_eq!(patch.get("author"), Some(&serde_json::Value::Null));
        assert!(patch.get("title").is_none());
    }
}
