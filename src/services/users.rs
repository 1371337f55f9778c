//! User service

use validator::Validate;

use super::{aggregates::Aggregator, apply_patch, fetch, not_found, page_of, parse_id, remove};
use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::{PageQuery, PaginatedResponse, Pagination},
        reference::resolve_many,
        user::{
            AddUserBooks, CreateUser, UpdateUser, User, UserQuery, UserRentals, UserResponse, READED_BOOKS,
            RENTAL_BOOKS,
        },
        MessageResponse,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    aggregator: Aggregator,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self {
            aggregator: Aggregator::new(repository.clone()),
            repository,
        }
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<PaginatedResponse<UserResponse>> {
        let page = Pagination::new(query.page, query.limit)?;
        page_of(&self.repository.users, &query.to_filter(), page).await
    }

    /// Users with rented books, joined with books and their libraries
    pub async fn rentals(&self, query: &PageQuery) -> AppResult<PaginatedResponse<UserRentals>> {
        self.aggregator.users_with_rentals(query).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<UserResponse>> {
        Ok(fetch(&self.repository.users, id).await?.map(UserResponse::from))
    }

    pub async fn create(&self, data: CreateUser) -> AppResult<UserResponse> {
        data.validate()?;
        let user = self.repository.users.insert(data.into_entity()).await?;
        tracing::debug!("User {} created", user.id);
        Ok(user.into())
    }

    pub async fn update(&self, id: &str, data: UpdateUser) -> AppResult<UserResponse> {
        let id = parse_id::<User>(id)?;
        data.validate()?;
        let user = apply_patch(&self.repository.users, &id, data.into_patch()).await?;
        Ok(user.into())
    }

    pub async fn delete(&self, id: &str) -> AppResult<MessageResponse> {
        remove(&self.repository.users, id).await
    }

    /// Append to a user's read and rented sets.
    ///
    /// Malformed references are skipped; at least one must survive.
    pub async fn add_books(&self, id: &str, data: AddUserBooks) -> AppResult<UserResponse> {
        let id = parse_id::<User>(id)?;
        let readed = resolve_many(&data.readed_books);
        let rented = resolve_many(&data.rental_books);
        if readed.is_empty() && rented.is_empty() {
            return Err(AppError::BadRequest("No valid book references provided".to_string()));
        }

        for (field, values) in [(READED_BOOKS, &readed), (RENTAL_BOOKS, &rented)] {
            if values.is_empty() {
                continue;
            }
            let outcome = self.repository.users.add_to_set(&id, field, values).await?;
            if outcome.matched == 0 {
                return Err(not_found::<User>());
            }
        }

        self.repository
            .users
            .find_by_id(&id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(not_found::<User>)
    }
}
