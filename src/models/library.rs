//! Library model

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::{render_many, resolve_many, ObjectRef};
use crate::repository::{Entity, Filter, Patch, Stored};

pub const BOOKS: &str = "books";

fn default_true() -> bool {
    true
}

/// Library document as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub establish_year: Option<i32>,
    /// Books held, appended to when a book naming this library is created
    #[serde(default)]
    pub books: Vec<ObjectRef>,
}

impl Entity for Library {
    const COLLECTION: &'static str = "libraries";
    const NAME: &'static str = "Library";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LibraryResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub is_public: bool,
    pub establish_year: Option<i32>,
    pub books: Vec<String>,
}

impl From<Stored<Library>> for LibraryResponse {
    fn from(library: Stored<Library>) -> Self {
        Self {
            id: library.id.to_hex(),
            name: library.data.name,
            location: library.data.location,
            is_public: library.data.is_public,
            establish_year: library.data.establish_year,
            books: render_many(&library.data.books),
        }
    }
}

/// Create library request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLibrary {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 200, message = "Location must be 3-200 characters"))]
    pub location: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub establish_year: Option<i32>,
    #[serde(default)]
    pub books: Vec<String>,
}

impl CreateLibrary {
    pub fn into_entity(self) -> Library {
        Library {
            name: self.name,
            location: self.location,
            is_public: self.is_public,
            establish_year: self.establish_year,
            books: resolve_many(&self.books),
        }
    }
}

/// Update library request
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrary {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 200, message = "Location must be 3-200 characters"))]
    pub location: Option<String>,
    pub is_public: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub establish_year: Option<Option<i32>>,
}

impl UpdateLibrary {
    pub fn into_patch(self) -> Patch {
        let mut patch = Patch::new();
        patch
            .set("name", self.name)
            .set("location", self.location)
            .set("is_public", self.is_public)
            .set_nullable("establish_year", self.establish_year);
        patch
    }
}

/// Book references to append to a library
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddBooks {
    pub book_ids: Vec<String>,
}

/// Library list query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct LibraryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub is_public: Option<bool>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub establish_year: Option<i32>,
    /// Reference of a book the library holds
    pub book_id: Option<String>,
}

impl LibraryQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .contains("name", self.name.as_deref())
            .equals("is_public", self.is_public)
            .contains("location", self.location.as_deref())
            .equals("establish_year", self.establish_year)
            .member(BOOKS, self.book_id.as_deref())
    }
}
