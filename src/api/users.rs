//! User endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::{PageQuery, UserPage, UserRentalsPage},
        user::{AddUserBooks, CreateUser, UpdateUser, UserQuery, UserResponse},
        MessageResponse,
    },
};

use super::found_or_no_content;

/// List users with filters and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = UserPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<UserPage>> {
    let page = state.services.users.list(&query).await?;
    Ok(Json(page))
}

/// List users renting books, with each book's libraries
#[utoipa::path(
    get,
    path = "/users/rentals",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users with rented books", body = UserRentalsPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_rentals(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserRentalsPage>> {
    let page = state.services.users.rentals(&query).await?;
    Ok(Json(page))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 204, description = "No user with this ID"),
        (status = 400, description = "Invalid ID format")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let user = state.services.users.get(&id).await?;
    Ok(found_or_no_content(user))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.create(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.update(&id, data).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.users.delete(&id).await?;
    Ok(Json(message))
}

/// Add books to a user's read and rented lists
#[utoipa::path(
    post,
    path = "/users/{id}/books",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    request_body = AddUserBooks,
    responses(
        (status = 200, description = "Books added", body = UserResponse),
        (status = 400, description = "No valid book ID provided"),
        (status = 404, description = "User not found")
    )
)]
pub async fn add_books(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<AddUserBooks>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.add_books(&id, data).await?;
    Ok(Json(user))
}
