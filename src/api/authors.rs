//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{AuthorQuery, AuthorResponse, CreateAuthor, UpdateAuthor},
        pagination::AuthorPage,
        MessageResponse,
    },
};

use super::found_or_no_content;

/// List authors with filters and pagination
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "List of authors", body = AuthorPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<AuthorPage>> {
    let page = state.services.authors.list(&query).await?;
    Ok(Json(page))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorResponse),
        (status = 204, description = "No author with this ID"),
        (status = 400, description = "Invalid ID format")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let author = state.services.authors.get(&id).await?;
    Ok(found_or_no_content(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = AuthorResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorResponse>)> {
    let author = state.services.authors.create(data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = AuthorResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateAuthor>,
) -> AppResult<Json<AuthorResponse>> {
    let author = state.services.authors.update(&id, data).await?;
    Ok(Json(author))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.authors.delete(&id).await?;
    Ok(Json(message))
}

/// Record a book as written by an author
#[utoipa::path(
    post,
    path = "/authors/{id}/written-books/{book_id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID"),
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book added to the author", body = AuthorResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn add_written_book(
    State(state): State<crate::AppState>,
    Path((id, book_id)): Path<(String, String)>,
) -> AppResult<Json<AuthorResponse>> {
    let author = state.services.authors.add_written_book(&id, &book_id).await?;
    Ok(Json(author))
}
