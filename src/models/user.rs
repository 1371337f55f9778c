//! User model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::reference::{render_many, resolve, resolve_many, ObjectRef};
use crate::repository::{Entity, Filter, Patch, Stored};

pub const READED_BOOKS: &str = "readed_books";
pub const RENTAL_BOOKS: &str = "rental_books";

/// User document as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub fav_library: Option<ObjectRef>,
    #[serde(default)]
    pub fav_category: Option<ObjectRef>,
    #[serde(default)]
    pub fav_author: Option<ObjectRef>,
    #[serde(default)]
    pub readed_books: Vec<ObjectRef>,
    #[serde(default)]
    pub rental_books: Vec<ObjectRef>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "User";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub fav_library: Option<String>,
    pub fav_category: Option<String>,
    pub fav_author: Option<String>,
    pub readed_books: Vec<String>,
    pub rental_books: Vec<String>,
}

impl From<Stored<User>> for UserResponse {
    fn from(user: Stored<User>) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.data.name,
            birthdate: user.data.birthdate,
            fav_library: user.data.fav_library.map(|r| r.to_hex()),
            fav_category: user.data.fav_category.map(|r| r.to_hex()),
            fav_author: user.data.fav_author.map(|r| r.to_hex()),
            readed_books: render_many(&user.data.readed_books),
            rental_books: render_many(&user.data.rental_books),
        }
    }
}

/// Library of a rented book, as nested in [`UserRentals`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentalLibrary {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Rented book with the libraries holding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentalBook {
    pub id: String,
    pub title: String,
    pub libraries: Vec<RentalLibrary>,
}

/// User joined with rented books and their libraries.
/// Dangling book or library references are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserRentals {
    pub id: String,
    pub name: String,
    pub readed_books: Vec<String>,
    pub rental_books: Vec<RentalBook>,
}

/// Create user request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub fav_library: Option<String>,
    pub fav_category: Option<String>,
    pub fav_author: Option<String>,
    #[serde(default)]
    pub readed_books: Vec<String>,
    #[serde(default)]
    pub rental_books: Vec<String>,
}

impl CreateUser {
    pub fn into_entity(self) -> User {
        User {
            name: self.name,
            birthdate: self.birthdate,
            fav_library: resolve(self.fav_library.as_deref()),
            fav_category: resolve(self.fav_category.as_deref()),
            fav_author: resolve(self.fav_author.as_deref()),
            readed_books: resolve_many(&self.readed_books),
            rental_books: resolve_many(&self.rental_books),
        }
    }
}

/// Update user request. Book sets are changed through [`AddUserBooks`].
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birthdate: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub fav_library: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub fav_category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub fav_author: Option<Option<String>>,
}

impl UpdateUser {
    pub fn into_patch(self) -> Patch {
        let mut patch = Patch::new();
        patch
            .set("name", self.name)
            .set_date("birthdate", self.birthdate)
            .set_reference("fav_library", self.fav_library)
            .set_reference("fav_category", self.fav_category)
            .set_reference("fav_author", self.fav_author);
        patch
    }
}

/// Book references to append to a user's read and rented sets
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AddUserBooks {
    #[serde(default)]
    pub readed_books: Vec<String>,
    #[serde(default)]
    pub rental_books: Vec<String>,
}

/// User list query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub fav_library: Option<String>,
    pub fav_category: Option<String>,
    pub fav_author: Option<String>,
    /// Reference of a book the user has read
    pub readed_book: Option<String>,
    /// Reference of a book the user has rented
    pub rental_book: Option<String>,
}

impl UserQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .contains("name", self.name.as_deref())
            .reference("fav_library", self.fav_library.as_deref())
            .reference("fav_category", self.fav_category.as_deref())
            .reference("fav_author", self.fav_author.as_deref())
            .member(READED_BOOKS, self.readed_book.as_deref())
            .member(RENTAL_BOOKS, self.rental_book.as_deref())
    }
}
