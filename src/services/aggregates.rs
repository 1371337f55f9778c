//! Read-side join views.
//!
//! The primary collection is paged first, then the foreign documents for
//! that page are fetched in one batch per collection and stitched in.

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{
        author::AuthorSummary,
        book::{BookQuery, BookWithAuthor},
        pagination::{PageQuery, PaginatedResponse, Pagination},
        reference::ObjectRef,
        user::{RentalBook, RentalLibrary, UserRentals, RENTAL_BOOKS},
    },
    repository::{Filter, Repository},
};

#[derive(Clone)]
pub struct Aggregator {
    repository: Repository,
}

/// Union of the references produced by `refs`, in first-seen order
fn distinct<'a>(refs: impl Iterator<Item = &'a ObjectRef>) -> Vec<ObjectRef> {
    let mut seen = HashSet::new();
    refs.filter(|r| seen.insert(**r)).copied().collect()
}

impl Aggregator {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Books matching `query`, each with its author embedded (or `null`)
    pub async fn books_with_authors(&self, query: &BookQuery) -> AppResult<PaginatedResponse<BookWithAuthor>> {
        let page = Pagination::new(query.page, query.limit)?;
        let filter = query.to_filter();

        let books = self.repository.books.find(&filter, page).await?;
        let total = self.repository.books.count(&filter).await?;

        let author_ids = distinct(books.iter().filter_map(|b| b.data.author.as_ref()));
        let authors: HashMap<ObjectRef, AuthorSummary> = self
            .repository
            .authors
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|a| (a.id, AuthorSummary::from(a)))
            .collect();

        let items = books
            .into_iter()
            .map(|book| {
                let author = book.data.author.and_then(|id| authors.get(&id).cloned());
                BookWithAuthor::new(book, author)
            })
            .collect();

        Ok(PaginatedResponse::new(items, total, page))
    }

    /// Users with at least one rented book, each rented book carrying the
    /// libraries that hold it
    pub async fn users_with_rentals(&self, query: &PageQuery) -> AppResult<PaginatedResponse<UserRentals>> {
        let page = Pagination::new(query.page, query.limit)?;
        let filter = Filter::new().non_empty(RENTAL_BOOKS);

        let users = self.repository.users.find(&filter, page).await?;
        let total = self.repository.users.count(&filter).await?;

        let book_ids = distinct(users.iter().flat_map(|u| u.data.rental_books.iter()));
        let books = self.repository.books.find_by_ids(&book_ids).await?;

        let library_ids = distinct(books.iter().flat_map(|b| b.data.libraries.iter()));
        let libraries: HashMap<ObjectRef, RentalLibrary> = self
            .repository
            .libraries
            .find_by_ids(&library_ids)
            .await?
            .into_iter()
            .map(|l| {
                (
                    l.id,
                    RentalLibrary {
                        id: l.id.to_hex(),
                        name: l.data.name,
                        location: l.data.location,
                    },
                )
            })
            .collect();

        let books: HashMap<ObjectRef, RentalBook> = books
            .into_iter()
            .map(|b| {
                let held_by = b
                    .data
                    .libraries
                    .iter()
                    .filter_map(|id| libraries.get(id).cloned())
                    .collect();
                (
                    b.id,
                    RentalBook {
                        id: b.id.to_hex(),
                        title: b.data.title,
                        libraries: held_by,
                    },
                )
            })
            .collect();

        let items = users
            .into_iter()
            .map(|u| UserRentals {
                id: u.id.to_hex(),
                name: u.data.name,
                readed_books: u.data.readed_books.iter().map(ObjectRef::to_hex).collect(),
                rental_books: u
                    .data
                    .rental_books
                    .iter()
                    .filter_map(|id| books.get(id).cloned())
                    .collect(),
            })
            .collect();

        Ok(PaginatedResponse::new(items, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{author::Author, book::Book, user::User};

    fn book(title: &str, author: Option<ObjectRef>) -> Book {
        Book {
            title: title.to_string(),
            isbn: "9780000000000".to_string(),
            author,
            category: None,
            published_date: None,
            libraries: vec![],
        }
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let a = ObjectRef::generate();
        let b = ObjectRef::generate();
        assert_eq!(distinct([a, b, a].iter()), vec![a, b]);
    }

    #[tokio::test]
    async fn test_dangling_author_is_null() {
        let repo = Repository::in_memory();
        let author = repo
            .authors
            .insert(Author {
                name: "Jorge Amado".to_string(),
                nationality: "Brazilian".to_string(),
                birthdate: None,
                fav_category: None,
                written_books: vec![],
            })
            .await
            .unwrap();
        repo.books.insert(book("Capitaes da Areia", Some(author.id))).await.unwrap();
        repo.books.insert(book("Orphan", Some(ObjectRef::generate()))).await.unwrap();
        repo.books.insert(book("Anonymous", None)).await.unwrap();

        let view = Aggregator::new(repo)
            .books_with_authors(&BookQuery::default())
            .await
            .unwrap();

        assert_eq!(view.total, 3);
        assert_eq!(view.items[0].author.as_ref().map(|a| a.name.as_str()), Some("Jorge Amado"));
        assert!(view.items[1].author.is_none());
        assert!(view.items[2].author.is_none());
    }

    #[tokio::test]
    async fn test_rentals_skip_users_without_rentals() {
        let repo = Repository::in_memory();
        let b = repo.books.insert(book("Vidas Secas", None)).await.unwrap();
        let user = |name: &str, rental_books: Vec<ObjectRef>| User {
            name: name.to_string(),
            birthdate: None,
            fav_library: None,
            fav_category: None,
            fav_author: None,
            readed_books: vec![],
            rental_books,
        };
        repo.users.insert(user("Idle", vec![])).await.unwrap();
        repo.users
            .insert(user("Reader", vec![b.id, ObjectRef::generate()]))
            .await
            .unwrap();

        let view = Aggregator::new(repo)
            .users_with_rentals(&PageQuery::default())
            .await
            .unwrap();

        assert_eq!(view.total, 1);
        assert_eq!(view.items[0].name, "Reader");
        assert_eq!(view.items[0].rental_books.len(), 1);
        assert_eq!(view.items[0].rental_books[0].title, "Vidas Secas");
    }
}
