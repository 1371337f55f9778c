//! Category endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        category::{CategoryQuery, CategoryResponse, CreateCategory, UpdateCategory},
        pagination::CategoryPage,
        MessageResponse,
    },
};

use super::found_or_no_content;

/// List categories with filters and pagination
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "List of categories", body = CategoryPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<CategoryPage>> {
    let page = state.services.categories.list(&query).await?;
    Ok(Json(page))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 204, description = "No category with this ID"),
        (status = 400, description = "Invalid ID format")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let category = state.services.categories.get(&id).await?;
    Ok(found_or_no_content(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state.services.categories.create(data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateCategory>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state.services.categories.update(&id, data).await?;
    Ok(Json(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.services.categories.delete(&id).await?;
    Ok(Json(message))
}
