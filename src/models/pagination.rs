//! Pagination parameters and paginated responses

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{
    author::AuthorResponse,
    book::{BookResponse, BookWithAuthor},
    category::CategoryResponse,
    library::LibraryResponse,
    user::{UserRentals, UserResponse},
};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Validated page window: `skip = (page - 1) * limit`, `take = limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    /// Build from raw query values, defaulting to page 1 of 10.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> AppResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::Validation("Page must be greater than zero".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let skip = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::Validation("Page is out of range".to_string()))?;

        Ok(Self {
            page,
            skip: skip as u64,
            limit: limit as u64,
        })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            skip: 0,
            limit: DEFAULT_LIMIT as u64,
        }
    }
}

/// Bare page parameters for endpoints without filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page (1-100)
    pub limit: Option<i64>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AuthorPage = PaginatedResponse<AuthorResponse>,
    BookPage = PaginatedResponse<BookResponse>,
    BookWithAuthorPage = PaginatedResponse<BookWithAuthor>,
    LibraryPage = PaginatedResponse<LibraryResponse>,
    CategoryPage = PaginatedResponse<CategoryResponse>,
    UserPage = PaginatedResponse<UserResponse>,
    UserRentalsPage = PaginatedResponse<UserRentals>
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items of the requested page
    pub items: Vec<T>,
    /// Total number of matching items
    pub total: u64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub limit: u64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: u64, page: Pagination) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None).unwrap();
        assert_eq!(p, Pagination { page: 1, skip: 0, limit: 10 });
    }

    #[test]
    fn test_skip_arithmetic() {
        let p = Pagination::new(Some(3), Some(25)).unwrap();
        assert_eq!(p.skip, 50);
        assert_eq!(p.limit, 25);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(matches!(Pagination::new(Some(0), None), Err(AppError::Validation(_))));
        assert!(matches!(Pagination::new(Some(-1), None), Err(AppError::Validation(_))));
        assert!(matches!(Pagination::new(None, Some(0)), Err(AppError::Validation(_))));
        assert!(matches!(Pagination::new(None, Some(101)), Err(AppError::Validation(_))));
        assert!(Pagination::new(None, Some(100)).is_ok());
    }
}
