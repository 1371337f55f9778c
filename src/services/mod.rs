//! Business logic services

pub mod aggregates;
pub mod authors;
pub mod books;
pub mod categories;
pub mod libraries;
pub mod links;
pub mod users;

use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::{PaginatedResponse, Pagination},
        reference::{resolve_many, ObjectRef},
        MessageResponse,
    },
    repository::{Collection, Entity, Filter, Patch, Repository, Stored},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub libraries: libraries::LibrariesService,
    pub categories: categories::CategoriesService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            libraries: libraries::LibrariesService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the storage backend answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.store.ping().await?;
        Ok(())
    }
}

/// Parse a path reference, rejecting malformed input before storage is hit
pub(crate) fn parse_id<T: Entity>(raw: &str) -> AppResult<ObjectRef> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID format", T::NAME)))
}

pub(crate) fn not_found<T: Entity>() -> AppError {
    AppError::NotFound(format!("{} not found", T::NAME))
}

/// One page of `collection` matching `filter`, rendered as `R`
pub(crate) async fn page_of<T, R>(
    collection: &Collection<T>,
    filter: &Filter,
    page: Pagination,
) -> AppResult<PaginatedResponse<R>>
where
    T: Entity,
    R: From<Stored<T>> + for<'a> ToSchema<'a>,
{
    let items = collection.find(filter, page).await?;
    let total = collection.count(filter).await?;
    Ok(PaginatedResponse::new(
        items.into_iter().map(R::from).collect(),
        total,
        page,
    ))
}

/// Fetch by raw reference. A well-formed reference without a document is
/// `None`, not an error.
pub(crate) async fn fetch<T: Entity>(collection: &Collection<T>, raw_id: &str) -> AppResult<Option<Stored<T>>> {
    let id = parse_id::<T>(raw_id)?;
    Ok(collection.find_by_id(&id).await?)
}

/// Write a sparse patch and return the document as it now stands
pub(crate) async fn apply_patch<T: Entity>(
    collection: &Collection<T>,
    id: &ObjectRef,
    patch: Patch,
) -> AppResult<Stored<T>> {
    ensure_not_empty(&patch)?;
    let outcome = collection.update_fields(id, patch).await?;
    if outcome.matched == 0 {
        return Err(not_found::<T>());
    }
    collection.find_by_id(id).await?.ok_or_else(not_found::<T>)
}

pub(crate) fn ensure_not_empty(patch: &Patch) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::Validation(
            "At least one field must be provided for update".to_string(),
        ));
    }
    Ok(())
}

pub(crate) async fn remove<T: Entity>(collection: &Collection<T>, raw_id: &str) -> AppResult<MessageResponse> {
    let id = parse_id::<T>(raw_id)?;
    if collection.delete(&id).await? == 0 {
        return Err(not_found::<T>());
    }
    tracing::info!("{} {} deleted", T::NAME, id);
    Ok(MessageResponse::new(format!("{} deleted successfully", T::NAME)))
}

/// Set-union the well-formed references of `raw` into `field` of one
/// document, then return it
pub(crate) async fn add_members<T: Entity>(
    collection: &Collection<T>,
    raw_id: &str,
    field: &str,
    raw: &[String],
) -> AppResult<Stored<T>> {
    let id = parse_id::<T>(raw_id)?;
    let values = resolve_many(raw);
    if values.is_empty() {
        return Err(AppError::BadRequest(format!("No valid references provided for {}", field)));
    }
    let outcome = collection.add_to_set(&id, field, &values).await?;
    if outcome.matched == 0 {
        return Err(not_found::<T>());
    }
    collection.find_by_id(&id).await?.ok_or_else(not_found::<T>)
}
