//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::{render_many, resolve, resolve_many, ObjectRef};
use crate::repository::{Entity, Filter, Patch, Stored};

pub const WRITTEN_BOOKS: &str = "written_books";

/// Author document as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub fav_category: Option<ObjectRef>,
    /// Books written by this author, maintained from the book side
    #[serde(default)]
    pub written_books: Vec<ObjectRef>,
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";
    const NAME: &'static str = "Author";
}

/// Author as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: String,
    pub name: String,
    pub nationality: String,
    pub birthdate: Option<NaiveDate>,
    pub fav_category: Option<String>,
    pub written_books: Vec<String>,
}

impl From<Stored<Author>> for AuthorResponse {
    fn from(author: Stored<Author>) -> Self {
        Self {
            id: author.id.to_hex(),
            name: author.data.name,
            nationality: author.data.nationality,
            birthdate: author.data.birthdate,
            fav_category: author.data.fav_category.map(|r| r.to_hex()),
            written_books: render_many(&author.data.written_books),
        }
    }
}

/// Reduced author projection embedded in aggregate views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub nationality: String,
}

impl From<&Stored<Author>> for AuthorSummary {
    fn from(author: &Stored<Author>) -> Self {
        Self {
            id: author.id.to_hex(),
            name: author.data.name.clone(),
            nationality: author.data.nationality.clone(),
        }
    }
}

/// Create author request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,
    #[validate(length(min = 3, max = 100, message = "Nationality must be 3-100 characters"))]
    pub nationality: String,
    pub birthdate: Option<NaiveDate>,
    pub fav_category: Option<String>,
    #[serde(default)]
    pub written_books: Vec<String>,
}

impl CreateAuthor {
    /// Resolve references leniently into the stored form
    pub fn into_entity(self) -> Author {
        Author {
            name: self.name,
            nationality: self.nationality,
            birthdate: self.birthdate,
            fav_category: resolve(self.fav_category.as_deref()),
            written_books: resolve_many(&self.written_books),
        }
    }
}

/// Update author request; absent fields are left unchanged, `null` clears
/// a nullable field
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 100, message = "Nationality must be 3-100 characters"))]
    pub nationality: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birthdate: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub fav_category: Option<Option<String>>,
}

impl UpdateAuthor {
    pub fn into_patch(self) -> Patch {
        let mut patch = Patch::new();
        patch
            .set("name", self.name)
            .set("nationality", self.nationality)
            .set_date("birthdate", self.birthdate)
            .set_reference("fav_category", self.fav_category);
        patch
    }
}

/// Author list query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct AuthorQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the nationality
    pub nationality: Option<String>,
    /// Reference of a book the author wrote
    pub written_book: Option<String>,
}

impl AuthorQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .contains("name", self.name.as_deref())
            .contains("nationality", self.nationality.as_deref())
            .member(WRITTEN_BOOKS, self.written_book.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_resolves_leniently() {
        let payload: CreateAuthor = serde_json::from_value(json!({
            "name": "Machado de Assis",
            "nationality": "Brazilian",
            "fav_category": "oops",
            "written_books": ["507f1f77bcf86cd799439011", "bad"]
        }))
        .unwrap();

        let author = payload.into_entity();
        assert_eq!(author.fav_category, None);
        assert_eq!(render_many(&author.written_books), vec!["507f1f77bcf86cd799439011"]);
    }

    #[test]
    fn test_update_null_versus_absent() {
        let update: UpdateAuthor = serde_json::from_value(json!({ "birthdate": null })).unwrap();
        let patch = update.into_patch();
        assert_eq!(patch.get("birthdate"), Some(&serde_json::Value::Null));
        assert!(patch.get("fav_category").is_none());
        assert!(patch.get("name").is_none());
    }

    #[test]
    fn test_name_length_is_validated() {
        let payload = CreateAuthor {
            name: "Al".to_string(),
            nationality: "Portuguese".to_string(),
            birthdate: None,
            fav_category: None,
            written_books: vec![],
        };
        assert!(payload.validate().is_err());
    }
}
