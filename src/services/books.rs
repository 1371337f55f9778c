//! Book service

use validator::Validate;

use super::{
    add_members, aggregates::Aggregator, apply_patch, fetch, links::LinkMaintainer, page_of, parse_id, remove,
};
use crate::{
    error::AppResult,
    models::{
        book::{AddLibraries, Book, BookQuery, BookResponse, BookWithAuthor, CreateBook, UpdateBook, LIBRARIES},
        pagination::{PaginatedResponse, Pagination},
        MessageResponse,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    links: LinkMaintainer,
    aggregator: Aggregator,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self {
            links: LinkMaintainer::new(repository.clone()),
            aggregator: Aggregator::new(repository.clone()),
            repository,
        }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<PaginatedResponse<BookResponse>> {
        let page = Pagination::new(query.page, query.limit)?;
        page_of(&self.repository.books, &query.to_filter(), page).await
    }

    /// Same filters as [`BooksService::list`], with each author embedded
    pub async fn list_with_authors(&self, query: &BookQuery) -> AppResult<PaginatedResponse<BookWithAuthor>> {
        self.aggregator.books_with_authors(query).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<BookResponse>> {
        Ok(fetch(&self.repository.books, id).await?.map(BookResponse::from))
    }

    /// Create a book, then link it from its author and libraries.
    ///
    /// The book is reported created even if linking fails.
    pub async fn create(&self, data: CreateBook) -> AppResult<BookResponse> {
        data.validate()?;
        let book = self.repository.books.insert(data.into_entity()).await?;
        let report = self.links.book_created(&book).await;
        tracing::debug!(
            "Book {} created (author linked: {}, libraries linked: {})",
            book.id,
            report.author_linked,
            report.libraries_linked
        );
        Ok(book.into())
    }

    /// Sparse update. Author and library back-references are not revisited.
    pub async fn update(&self, id: &str, data: UpdateBook) -> AppResult<BookResponse> {
        let id = parse_id::<Book>(id)?;
        data.validate()?;
        let book = apply_patch(&self.repository.books, &id, data.into_patch()).await?;
        Ok(book.into())
    }

    pub async fn delete(&self, id: &str) -> AppResult<MessageResponse> {
        remove(&self.repository.books, id).await
    }

    /// Append libraries to a book. The libraries' `books` are not touched.
    pub async fn add_libraries(&self, id: &str, data: AddLibraries) -> AppResult<BookResponse> {
        let book = add_members(&self.repository.books, id, LIBRARIES, &data.library_ids).await?;
        Ok(book.into())
    }
}
