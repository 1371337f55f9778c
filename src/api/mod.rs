//! API handlers for Libris REST endpoints

pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod libraries;
pub mod openapi;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// 200 with the entity, or 204 when a well-formed ID matched nothing
pub(crate) fn found_or_no_content<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(v) => Json(v).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/written-books/:book_id", post(authors::add_written_book))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/with-authors", get(books::list_books_with_authors))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:id/libraries", post(books::add_libraries))
        // Libraries
        .route("/libraries", get(libraries::list_libraries).post(libraries::create_library))
        .route(
            "/libraries/:id",
            get(libraries::get_library)
                .put(libraries::update_library)
                .delete(libraries::delete_library),
        )
        .route("/libraries/:id/books", post(libraries::add_books))
        // Categories
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/rentals", get(users::list_rentals))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/users/:id/books", post(users::add_books))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
