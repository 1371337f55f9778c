//! Back-reference maintenance between books, authors and libraries.
//!
//! Runs after the primary write has succeeded. Every step is best-effort:
//! a failure is logged and reported, never propagated.

use crate::{
    models::{author::WRITTEN_BOOKS, book::Book, library::BOOKS},
    repository::{Repository, Stored},
};

/// What a link pass managed to write
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    /// The referenced author exists and now lists the book
    pub author_linked: bool,
    /// Libraries found among the book's `libraries`
    pub libraries_linked: u64,
    /// Secondary writes that failed
    pub failures: u32,
}

#[derive(Clone)]
pub struct LinkMaintainer {
    repository: Repository,
}

impl LinkMaintainer {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Append a freshly created book to its author's `written_books` and to
    /// the `books` of each library it names
    pub async fn book_created(&self, book: &Stored<Book>) -> LinkReport {
        let mut report = LinkReport::default();
        let book_ref = std::slice::from_ref(&book.id);

        if let Some(author) = &book.data.author {
            match self.repository.authors.add_to_set(author, WRITTEN_BOOKS, book_ref).await {
                Ok(outcome) if outcome.matched == 0 => {
                    tracing::debug!("Book {}: author {} not found, nothing linked", book.id, author);
                }
                Ok(_) => report.author_linked = true,
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!("Book {}: failed to link author {}: {}", book.id, author, e);
                }
            }
        }

        if !book.data.libraries.is_empty() {
            match self
                .repository
                .libraries
                .add_to_set_many(&book.data.libraries, BOOKS, book_ref)
                .await
            {
                Ok(outcome) => {
                    report.libraries_linked = outcome.matched;
                    if outcome.matched < book.data.libraries.len() as u64 {
                        tracing::debug!(
                            "Book {}: {} of {} libraries found",
                            book.id,
                            outcome.matched,
                            book.data.libraries.len()
                        );
                    }
                }
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!("Book {}: failed to link libraries: {}", book.id, e);
                }
            }
        }

        report
    }
}
