//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::{resolve, ObjectRef};
use crate::repository::{Entity, Filter, Patch, Scalar, Stored};

fn default_true() -> bool {
    true
}

/// Category document as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub status: bool,
    #[serde(default)]
    pub popularity_score: f64,
    #[serde(default)]
    pub parent_category: Option<ObjectRef>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every update, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const NAME: &'static str = "Category";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: bool,
    pub popularity_score: f64,
    pub parent_category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Stored<Category>> for CategoryResponse {
    fn from(category: Stored<Category>) -> Self {
        Self {
            id: category.id.to_hex(),
            name: category.data.name,
            description: category.data.description,
            status: category.data.status,
            popularity_score: category.data.popularity_score,
            parent_category: category.data.parent_category.map(|r| r.to_hex()),
            created_at: category.data.created_at,
            updated_at: category.data.updated_at,
        }
    }
}

/// Create category request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 3, max = 50, message = "Name must be 3-50 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub status: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Popularity score cannot be negative"))]
    pub popularity_score: f64,
    pub parent_category: Option<String>,
}

impl CreateCategory {
    /// Stored form, stamped with `now` as both creation and update time
    pub fn into_entity(self, now: DateTime<Utc>) -> Category {
        Category {
            name: self.name,
            description: self.description,
            status: self.status,
            popularity_score: self.popularity_score,
            parent_category: resolve(self.parent_category.as_deref()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update category request
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 3, max = 50, message = "Name must be 3-50 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<bool>,
    #[validate(range(min = 0.0, message = "Popularity score cannot be negative"))]
    pub popularity_score: Option<f64>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub parent_category: Option<Option<String>>,
}

impl UpdateCategory {
    /// Patch of the provided fields. `updated_at` is stamped separately.
    pub fn into_patch(self) -> Patch {
        let mut patch = Patch::new();
        patch
            .set("name", self.name)
            .set_nullable("description", self.description)
            .set("status", self.status)
            .set("popularity_score", self.popularity_score)
            .set_reference("parent_category", self.parent_category);
        patch
    }
}

/// Category list query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct CategoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub status: Option<bool>,
    /// Lower bound on `popularity_score` (inclusive)
    pub min_popularity: Option<f64>,
    /// Parent category reference
    pub parent_category: Option<String>,
}

impl CategoryQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .contains("name", self.name.as_deref())
            .equals("status", self.status)
            .at_least("popularity_score", self.min_popularity.map(Scalar::Number))
            .reference("parent_category", self.parent_category.as_deref())
    }
}
