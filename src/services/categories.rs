//! Category service

use chrono::Utc;
use validator::Validate;

use super::{apply_patch, ensure_not_empty, fetch, not_found, page_of, parse_id, remove};
use crate::{
    error::AppResult,
    models::{
        category::{Category, CategoryQuery, CategoryResponse, CreateCategory, UpdateCategory},
        pagination::{PaginatedResponse, Pagination},
        MessageResponse,
    },
    repository::{Repository, StoreError},
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &CategoryQuery) -> AppResult<PaginatedResponse<CategoryResponse>> {
        let page = Pagination::new(query.page, query.limit)?;
        page_of(&self.repository.categories, &query.to_filter(), page).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<CategoryResponse>> {
        Ok(fetch(&self.repository.categories, id).await?.map(CategoryResponse::from))
    }

    pub async fn create(&self, data: CreateCategory) -> AppResult<CategoryResponse> {
        data.validate()?;
        let category = self.repository.categories.insert(data.into_entity(Utc::now())).await?;
        tracing::debug!("Category {} created", category.id);
        Ok(category.into())
    }

    /// Sparse update, refreshing `updated_at`
    pub async fn update(&self, id: &str, data: UpdateCategory) -> AppResult<CategoryResponse> {
        let id = parse_id::<Category>(id)?;
        data.validate()?;
        let mut patch = data.into_patch();
        ensure_not_empty(&patch)?;

        let current = self
            .repository
            .categories
            .find_by_id(&id)
            .await?
            .ok_or_else(not_found::<Category>)?;

        // Clocks may step backwards; never stamp before creation
        let updated_at = Utc::now().max(current.data.created_at);
        patch.set("updated_at", Some(serde_json::to_value(updated_at).map_err(StoreError::from)?));

        let category = apply_patch(&self.repository.categories, &id, patch).await?;
        Ok(category.into())
    }

    pub async fn delete(&self, id: &str) -> AppResult<MessageResponse> {
        remove(&self.repository.categories, id).await
    }
}
