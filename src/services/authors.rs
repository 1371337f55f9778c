//! Author service

use validator::Validate;

use super::{add_members, apply_patch, fetch, page_of, parse_id, remove};
use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, AuthorResponse, CreateAuthor, UpdateAuthor, WRITTEN_BOOKS},
        book::Book,
        pagination::{PaginatedResponse, Pagination},
        MessageResponse,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &AuthorQuery) -> AppResult<PaginatedResponse<AuthorResponse>> {
        let page = Pagination::new(query.page, query.limit)?;
        page_of(&self.repository.authors, &query.to_filter(), page).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<AuthorResponse>> {
        Ok(fetch(&self.repository.authors, id).await?.map(AuthorResponse::from))
    }

    pub async fn create(&self, data: CreateAuthor) -> AppResult<AuthorResponse> {
        data.validate()?;
        let author = self.repository.authors.insert(data.into_entity()).await?;
        tracing::debug!("Author {} created", author.id);
        Ok(author.into())
    }

    pub async fn update(&self, id: &str, data: UpdateAuthor) -> AppResult<AuthorResponse> {
        let id = parse_id::<Author>(id)?;
        data.validate()?;
        let author = apply_patch(&self.repository.authors, &id, data.into_patch()).await?;
        Ok(author.into())
    }

    /// Delete an author. Books keep pointing at it.
    pub async fn delete(&self, id: &str) -> AppResult<MessageResponse> {
        remove(&self.repository.authors, id).await
    }

    /// Add one book to an author's `written_books`
    pub async fn add_written_book(&self, id: &str, book_id: &str) -> AppResult<AuthorResponse> {
        parse_id::<Author>(id)?;
        let book_id = parse_id::<Book>(book_id)?;
        let author = add_members(
            &self.repository.authors,
            id,
            WRITTEN_BOOKS,
            &[book_id.to_hex()],
        )
        .await?;
        Ok(author.into())
    }
}
