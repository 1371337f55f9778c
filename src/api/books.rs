//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{AddLibraries, BookQuery, BookResponse, CreateBook, UpdateBook},
        pagination::{BookPage, BookWithAuthorPage},
        MessageResponse,
    },
};

use super::found_or_no_content;

/// List books with filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = BookPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.books.list(&query).await?;
    Ok(Json(page))
}

/// List books with their author embedded
#[utoipa::path(
    get,
    path = "/books/with-authors",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books with authors", body = BookWithAuthorPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_books_with_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookWithAuthorPage>> {
    let page = state.services.books.list_with_authors(&query).await?;
    Ok(Json(page))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 204, description = "No book with this ID"),
        (status = 400, description = "Invalid ID format")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let book = state.services.books.get(&id).await?;
    Ok(found_or_no_content(book))
}

/// Create a book and link it from its author and libraries
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = state.services.books.create(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.update(&id, data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.books.delete(&id).await?;
    Ok(Json(message))
}

/// Add libraries to a book
#[utoipa::path(
    post,
    path = "/books/{id}/libraries",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = AddLibraries,
    responses(
        (status = 200, description = "Libraries added", body = BookResponse),
        (status = 400, description = "No valid library ID provided"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_libraries(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<AddLibraries>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.add_libraries(&id, data).await?;
    Ok(Json(book))
}
