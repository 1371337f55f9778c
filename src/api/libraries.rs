//! Library endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        library::{AddBooks, CreateLibrary, LibraryQuery, LibraryResponse, UpdateLibrary},
        pagination::LibraryPage,
        MessageResponse,
    },
};

use super::found_or_no_content;

/// List libraries with filters and pagination
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    params(LibraryQuery),
    responses(
        (status = 200, description = "List of libraries", body = LibraryPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
    Query(query): Query<LibraryQuery>,
) -> AppResult<Json<LibraryPage>> {
    let page = state.services.libraries.list(&query).await?;
    Ok(Json(page))
}

/// Get library by ID
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    params(("id" = String, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library details", body = LibraryResponse),
        (status = 204, description = "No library with this ID"),
        (status = 400, description = "Invalid ID format")
    )
)]
pub async fn get_library(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let library = state.services.libraries.get(&id).await?;
    Ok(found_or_no_content(library))
}

/// Create a library
#[utoipa::path(
    post,
    path = "/libraries",
    tag = "libraries",
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = LibraryResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_library(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateLibrary>,
) -> AppResult<(StatusCode, Json<LibraryResponse>)> {
    let library = state.services.libraries.create(data).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

/// Update a library
#[utoipa::path(
    put,
    path = "/libraries/{id}",
    tag = "libraries",
    params(("id" = String, Path, description = "Library ID")),
    request_body = UpdateLibrary,
    responses(
        (status = 200, description = "Library updated", body = LibraryResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn update_library(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateLibrary>,
) -> AppResult<Json<LibraryResponse>> {
    let library = state.services.libraries.update(&id, data).await?;
    Ok(Json(library))
}

/// Delete a library
#[utoipa::path(
    delete,
    path = "/libraries/{id}",
    tag = "libraries",
    params(("id" = String, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn delete_library(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.libraries.delete(&id).await?;
    Ok(Json(message))
}

/// Add books to a library
#[utoipa::path(
    post,
    path = "/libraries/{id}/books",
    tag = "libraries",
    params(("id" = String, Path, description = "Library ID")),
    request_body = AddBooks,
    responses(
        (status = 200, description = "Books added", body = LibraryResponse),
        (status = 400, description = "No valid book ID provided"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn add_books(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<AddBooks>,
) -> AppResult<Json<LibraryResponse>> {
    let library = state.services.libraries.add_books(&id, data).await?;
    Ok(Json(library))
}
