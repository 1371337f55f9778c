//! Service-level tests of reference handling, link maintenance and join views

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use libris_server::{
    error::AppError,
    models::{
        author::{AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{AddLibraries, BookQuery, CreateBook, UpdateBook},
        category::{CreateCategory, UpdateCategory},
        library::{AddBooks, CreateLibrary},
        pagination::PageQuery,
        reference::ObjectRef,
        user::{AddUserBooks, CreateUser},
    },
    repository::{
        Document, DocumentStore, Filter, MemoryStore, Patch, Repository, StoreError, StoreResult, UpdateOutcome,
    },
    services::Services,
};

fn services() -> Services {
    Services::new(Repository::in_memory())
}

fn author(name: &str, nationality: &str) -> CreateAuthor {
    CreateAuthor {
        name: name.to_string(),
        nationality: nationality.to_string(),
        birthdate: None,
        fav_category: None,
        written_books: vec![],
    }
}

fn library(name: &str) -> CreateLibrary {
    CreateLibrary {
        name: name.to_string(),
        location: "Lisboa".to_string(),
        is_public: true,
        establish_year: Some(1796),
        books: vec![],
    }
}

fn book(title: &str, author: Option<&str>, libraries: Vec<String>) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        isbn: "9789722030701".to_string(),
        author: author.map(str::to_string),
        category: None,
        published_date: None,
        libraries,
    }
}

fn user(name: &str, rental_books: Vec<String>) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        birthdate: None,
        fav_library: None,
        fav_category: None,
        fav_author: None,
        readed_books: vec![],
        rental_books,
    }
}

#[tokio::test]
async fn test_book_creation_links_author() {
    let s = services();
    let a = s.authors.create(author("Jose Saramago", "Portuguese")).await.unwrap();
    let b = s.books.create(book("Ensaio sobre a Cegueira", Some(a.id.as_str()), vec![])).await.unwrap();

    let a = s.authors.get(&a.id).await.unwrap().unwrap();
    assert_eq!(a.written_books, vec![b.id]);
}

#[tokio::test]
async fn test_book_creation_links_only_valid_libraries() {
    let s = services();
    let l = s.libraries.create(library("Biblioteca Nacional")).await.unwrap();
    let b = s
        .books
        .create(book("Memorial do Convento", None, vec![l.id.clone(), "not-a-ref".to_string()]))
        .await
        .unwrap();

    assert_eq!(b.libraries, vec![l.id.clone()]);
    let l = s.libraries.get(&l.id).await.unwrap().unwrap();
    assert_eq!(l.books, vec![b.id]);
}

#[tokio::test]
async fn test_book_with_unknown_author_is_still_created() {
    let s = services();
    let ghost = ObjectRef::generate().to_hex();
    let b = s.books.create(book("Levantado do Chao", Some(ghost.as_str()), vec![])).await.unwrap();
    assert_eq!(b.author, Some(ghost));
}

#[tokio::test]
async fn test_add_members_is_idempotent() {
    let s = services();
    let l = s.libraries.create(library("Gulbenkian")).await.unwrap();
    let b = s.books.create(book("O Ano da Morte", None, vec![])).await.unwrap();

    let add = || AddBooks { book_ids: vec![b.id.clone()] };
    assert_eq!(s.libraries.add_books(&l.id, add()).await.unwrap().books.len(), 1);
    assert_eq!(s.libraries.add_books(&l.id, add()).await.unwrap().books.len(), 1);

    let a = s.authors.create(author("Fernando Pessoa", "Portuguese")).await.unwrap();
    s.authors.add_written_book(&a.id, &b.id).await.unwrap();
    let a = s.authors.add_written_book(&a.id, &b.id).await.unwrap();
    assert_eq!(a.written_books, vec![b.id.clone()]);

    let u = s.users.create(user("Ana Silva", vec![])).await.unwrap();
    let books = || AddUserBooks {
        readed_books: vec![b.id.clone()],
        rental_books: vec![b.id.clone()],
    };
    s.users.add_books(&u.id, books()).await.unwrap();
    let u = s.users.add_books(&u.id, books()).await.unwrap();
    assert_eq!(u.readed_books.len(), 1);
    assert_eq!(u.rental_books.len(), 1);
}

#[tokio::test]
async fn test_add_members_errors() {
    let s = services();
    let b = s.books.create(book("A Jangada de Pedra", None, vec![])).await.unwrap();
    let ghost = ObjectRef::generate().to_hex();

    let err = s
        .books
        .add_libraries(&b.id, AddLibraries { library_ids: vec!["junk".to_string()] })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = s
        .books
        .add_libraries(&ghost, AddLibraries { library_ids: vec![ghost.clone()] })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = s.authors.add_written_book("bad", &b.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = s.authors.add_written_book(&ghost, &b.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = s.users.add_books(&ghost, AddUserBooks::default()).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_book_add_libraries_does_not_touch_libraries() {
    let s = services();
    let l = s.libraries.create(library("Municipal")).await.unwrap();
    let b = s.books.create(book("Caim", None, vec![])).await.unwrap();

    let b = s
        .books
        .add_libraries(&b.id, AddLibraries { library_ids: vec![l.id.clone()] })
        .await
        .unwrap();
    assert_eq!(b.libraries, vec![l.id.clone()]);
    assert!(s.libraries.get(&l.id).await.unwrap().unwrap().books.is_empty());
}

#[tokio::test]
async fn test_author_filter_is_case_insensitive() {
    let s = services();
    s.authors.create(author("Jorge Amado", "Brazilian")).await.unwrap();
    s.authors.create(author("Clarice Lispector", "brazilian")).await.unwrap();
    s.authors.create(author("Mia Couto", "Mozambican")).await.unwrap();

    let by = |nationality: &str| AuthorQuery {
        nationality: Some(nationality.to_string()),
        ..Default::default()
    };
    let lower = s.authors.list(&by("brazil")).await.unwrap();
    let upper = s.authors.list(&by("BRAZIL")).await.unwrap();
    assert_eq!(lower.total, 2);
    assert_eq!(lower.items, upper.items);
}

#[tokio::test]
async fn test_pagination_is_rejected_not_clamped() {
    let s = services();
    let q = AuthorQuery {
        page: Some(0),
        ..Default::default()
    };
    assert!(matches!(s.authors.list(&q).await, Err(AppError::Validation(_))));

    let q = BookQuery {
        limit: Some(101),
        ..Default::default()
    };
    assert!(matches!(s.books.list(&q).await, Err(AppError::Validation(_))));
    assert!(matches!(s.books.list_with_authors(&q).await, Err(AppError::Validation(_))));

    let q = PageQuery {
        page: Some(-3),
        limit: None,
    };
    assert!(matches!(s.users.rentals(&q).await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_pages_split_the_primary_collection() {
    let s = services();
    for i in 0..5 {
        s.authors.create(author(&format!("Author {}", i), "Angolan")).await.unwrap();
    }
    let q = AuthorQuery {
        page: Some(3),
        limit: Some(2),
        ..Default::default()
    };
    let page = s.authors.list(&q).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Author 4");
}

#[tokio::test]
async fn test_deleted_author_leaves_book_pointing_nowhere() {
    let s = services();
    let a = s.authors.create(author("Eca de Queiros", "Portuguese")).await.unwrap();
    let b = s.books.create(book("Os Maias", Some(a.id.as_str()), vec![])).await.unwrap();

    s.authors.delete(&a.id).await.unwrap();

    let stored = s.books.get(&b.id).await.unwrap().unwrap();
    assert_eq!(stored.author, Some(a.id));
    let view = s.books.list_with_authors(&BookQuery::default()).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert!(view.items[0].author.is_none());
}

#[tokio::test]
async fn test_rentals_view_nests_libraries() {
    let s = services();
    let l = s.libraries.create(library("Camoes")).await.unwrap();
    let b = s
        .books
        .create(book("Mensagem", None, vec![l.id.clone(), ObjectRef::generate().to_hex()]))
        .await
        .unwrap();
    s.users.create(user("No Rentals", vec![])).await.unwrap();
    s.users
        .create(user("Renter", vec![b.id.clone(), ObjectRef::generate().to_hex()]))
        .await
        .unwrap();

    let view = s.users.rentals(&PageQuery::default()).await.unwrap();
    assert_eq!(view.total, 1);
    let renter = &view.items[0];
    assert_eq!(renter.name, "Renter");
    assert_eq!(renter.rental_books.len(), 1);
    assert_eq!(renter.rental_books[0].id, b.id);
    assert_eq!(renter.rental_books[0].libraries.len(), 1);
    assert_eq!(renter.rental_books[0].libraries[0].name, "Camoes");
}

#[tokio::test]
async fn test_rentals_view_filters_before_paging() {
    let s = services();
    let b = s.books.create(book("Sonetos", None, vec![])).await.unwrap();
    for i in 0..3 {
        s.users.create(user(&format!("Reader {}", i), vec![])).await.unwrap();
    }
    s.users.create(user("Renter", vec![b.id.clone()])).await.unwrap();

    let q = PageQuery {
        page: Some(1),
        limit: Some(1),
    };
    let view = s.users.rentals(&q).await.unwrap();
    assert_eq!(view.total, 1);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].name, "Renter");
    assert_eq!(view.items[0].rental_books[0].title, "Sonetos");
}

#[tokio::test]
async fn test_books_with_authors_pages_books_first() {
    let s = services();
    let first = s.authors.create(author("Alexandre Herculano", "Portuguese")).await.unwrap();
    let second = s.authors.create(author("Almeida Garrett", "Portuguese")).await.unwrap();
    s.books.create(book("Eurico", Some(first.id.as_str()), vec![])).await.unwrap();
    let b = s.books.create(book("Frei Luis", Some(second.id.as_str()), vec![])).await.unwrap();

    let q = BookQuery {
        page: Some(2),
        limit: Some(1),
        ..Default::default()
    };
    let view = s.books.list_with_authors(&q).await.unwrap();
    assert_eq!(view.total, 2);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, b.id);
    let embedded = view.items[0].author.as_ref().unwrap();
    assert_eq!(embedded.name, "Almeida Garrett");
}

#[tokio::test]
async fn test_book_update_keeps_libraries_when_none_resolve() {
    let s = services();
    let l = s.libraries.create(library("Joanina")).await.unwrap();
    let b = s.books.create(book("Viagens", None, vec![l.id.clone()])).await.unwrap();

    let update: UpdateBook = serde_json::from_value(json!({ "libraries": ["junk"] })).unwrap();
    let err = s.books.update(&b.id, update).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let update: UpdateBook =
        serde_json::from_value(json!({ "title": "Viagens na Minha Terra", "libraries": ["junk"] })).unwrap();
    let updated = s.books.update(&b.id, update).await.unwrap();
    assert_eq!(updated.title, "Viagens na Minha Terra");
    assert_eq!(updated.libraries, vec![l.id.clone()]);

    let update: UpdateBook = serde_json::from_value(json!({ "libraries": [] })).unwrap();
    assert!(s.books.update(&b.id, update).await.unwrap().libraries.is_empty());
}

#[tokio::test]
async fn test_round_trip() {
    let s = services();
    let payload: CreateUser = serde_json::from_value(json!({
        "name": "Beatriz",
        "birthdate": "1990-04-25",
        "fav_author": "507f1f77bcf86cd799439011",
        "readed_books": ["507f1f77bcf86cd799439012"]
    }))
    .unwrap();
    let created = s.users.create(payload).await.unwrap();
    let fetched = s.users.get(&created.id).await.unwrap().unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.birthdate.map(|d| d.to_string()), Some("1990-04-25".to_string()));
    assert_eq!(fetched.fav_author.as_deref(), Some("507f1f77bcf86cd799439011"));
    assert_eq!(fetched.readed_books, vec!["507f1f77bcf86cd799439012"]);
}

#[tokio::test]
async fn test_get_distinguishes_malformed_from_missing() {
    let s = services();
    assert!(matches!(s.books.get("xyz").await, Err(AppError::BadRequest(_))));
    assert!(s.books.get(&ObjectRef::generate().to_hex()).await.unwrap().is_none());

    let b = s.books.create(book("Claraboia", None, vec![])).await.unwrap();
    let padded = format!(" {}", b.id);
    assert!(matches!(s.books.get(&padded).await, Err(AppError::BadRequest(_))));
    assert!(matches!(s.books.delete(&format!("{} ", b.id)).await, Err(AppError::BadRequest(_))));
    assert!(s.books.get(&b.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_semantics() {
    let s = services();
    let a = s.authors.create(author("Sophia de Mello", "Portuguese")).await.unwrap();

    let err = s.authors.update(&a.id, UpdateAuthor::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let ghost = ObjectRef::generate().to_hex();
    let update = UpdateAuthor {
        name: Some("Someone Else".to_string()),
        ..Default::default()
    };
    assert!(matches!(s.authors.update(&ghost, update).await, Err(AppError::NotFound(_))));

    let cat = ObjectRef::generate().to_hex();
    let update: UpdateAuthor = serde_json::from_value(json!({ "fav_category": cat.clone() })).unwrap();
    let a = s.authors.update(&a.id, update).await.unwrap();
    assert_eq!(a.fav_category, Some(cat));

    let update: UpdateAuthor = serde_json::from_value(json!({ "fav_category": null })).unwrap();
    let a = s.authors.update(&a.id, update).await.unwrap();
    assert_eq!(a.fav_category, None);
    assert_eq!(a.name, "Sophia de Mello");
}

#[tokio::test]
async fn test_book_update_does_not_relink() {
    let s = services();
    let first = s.authors.create(author("Agustina Bessa", "Portuguese")).await.unwrap();
    let second = s.authors.create(author("Lidia Jorge", "Portuguese")).await.unwrap();
    let b = s.books.create(book("A Sibila", Some(first.id.as_str()), vec![])).await.unwrap();

    let update = UpdateBook {
        author: Some(Some(second.id.clone())),
        ..Default::default()
    };
    let b = s.books.update(&b.id, update).await.unwrap();
    assert_eq!(b.author, Some(second.id.clone()));

    assert_eq!(s.authors.get(&first.id).await.unwrap().unwrap().written_books, vec![b.id]);
    assert!(s.authors.get(&second.id).await.unwrap().unwrap().written_books.is_empty());
}

#[tokio::test]
async fn test_category_timestamps() {
    let s = services();
    let payload: CreateCategory = serde_json::from_value(json!({ "name": "Poesia" })).unwrap();
    let created = s.categories.create(payload).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let update = UpdateCategory {
        popularity_score: Some(4.5),
        ..Default::default()
    };
    let updated = s.categories.update(&created.id, update).await.unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.popularity_score, 4.5);
}

#[tokio::test]
async fn test_delete() {
    let s = services();
    let l = s.libraries.create(library("Sala de Leitura")).await.unwrap();
    let msg = s.libraries.delete(&l.id).await.unwrap();
    assert_eq!(msg.message, "Library deleted successfully");
    assert!(matches!(s.libraries.delete(&l.id).await, Err(AppError::NotFound(_))));
    assert!(s.libraries.get(&l.id).await.unwrap().is_none());
}

/// Store whose set-union writes always fail
struct BrokenLinks(MemoryStore);

#[async_trait]
impl DocumentStore for BrokenLinks {
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<ObjectRef> {
        self.0.insert(collection, doc).await
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectRef) -> StoreResult<Option<Document>> {
        self.0.find_by_id(collection, id).await
    }

    async fn find(&self, collection: &str, filter: &Filter, skip: u64, limit: Option<u64>) -> StoreResult<Vec<Document>> {
        self.0.find(collection, filter, skip, limit).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.0.count(collection, filter).await
    }

    async fn update_fields(&self, collection: &str, id: &ObjectRef, patch: Patch) -> StoreResult<UpdateOutcome> {
        self.0.update_fields(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &ObjectRef) -> StoreResult<u64> {
        self.0.delete(collection, id).await
    }

    async fn add_to_set(
        &self,
        _collection: &str,
        _ids: &[ObjectRef],
        _field: &str,
        _values: &[ObjectRef],
    ) -> StoreResult<UpdateOutcome> {
        Err(StoreError::Backend("connection reset".to_string()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_link_failure_does_not_fail_creation() {
    let s = Services::new(Repository::new(Arc::new(BrokenLinks(MemoryStore::new()))));
    let a = s.authors.create(author("Florbela Espanca", "Portuguese")).await.unwrap();
    let l = s.libraries.create(library("Evora")).await.unwrap();

    let b = s
        .books
        .create(book("Charneca em Flor", Some(a.id.as_str()), vec![l.id.clone()]))
        .await
        .unwrap();

    assert!(s.books.get(&b.id).await.unwrap().is_some());
    assert!(s.authors.get(&a.id).await.unwrap().unwrap().written_books.is_empty());
}
