//! Library service

use validator::Validate;

use super::{add_members, apply_patch, fetch, page_of, parse_id, remove};
use crate::{
    error::AppResult,
    models::{
        library::{AddBooks, CreateLibrary, Library, LibraryQuery, LibraryResponse, UpdateLibrary, BOOKS},
        pagination::{PaginatedResponse, Pagination},
        MessageResponse,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
}

impl LibrariesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &LibraryQuery) -> AppResult<PaginatedResponse<LibraryResponse>> {
        let page = Pagination::new(query.page, query.limit)?;
        page_of(&self.repository.libraries, &query.to_filter(), page).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<LibraryResponse>> {
        Ok(fetch(&self.repository.libraries, id).await?.map(LibraryResponse::from))
    }

    pub async fn create(&self, data: CreateLibrary) -> AppResult<LibraryResponse> {
        data.validate()?;
        let library = self.repository.libraries.insert(data.into_entity()).await?;
        tracing::debug!("Library {} created", library.id);
        Ok(library.into())
    }

    pub async fn update(&self, id: &str, data: UpdateLibrary) -> AppResult<LibraryResponse> {
        let id = parse_id::<Library>(id)?;
        data.validate()?;
        let library = apply_patch(&self.repository.libraries, &id, data.into_patch()).await?;
        Ok(library.into())
    }

    pub async fn delete(&self, id: &str) -> AppResult<MessageResponse> {
        remove(&self.repository.libraries, id).await
    }

    /// Append books to a library's holdings. Malformed references are skipped.
    pub async fn add_books(&self, id: &str, data: AddBooks) -> AppResult<LibraryResponse> {
        let library = add_members(&self.repository.libraries, id, BOOKS, &data.book_ids).await?;
        Ok(library.into())
    }
}
