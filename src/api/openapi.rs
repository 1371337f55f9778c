//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, categories, health, libraries, users};
use crate::models::{author, book, category, library, pagination, user};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library catalog REST API: books, authors, libraries, categories and users",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        authors::add_written_book,
        // Books
        books::list_books,
        books::list_books_with_authors,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::add_libraries,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        libraries::create_library,
        libraries::update_library,
        libraries::delete_library,
        libraries::add_books,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Users
        users::list_users,
        users::list_rentals,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::add_books,
    ),
    components(
        schemas(
            // Authors
            author::AuthorResponse,
            author::AuthorSummary,
            author::CreateAuthor,
            author::UpdateAuthor,
            // Books
            book::BookResponse,
            book::BookWithAuthor,
            book::CreateBook,
            book::UpdateBook,
            book::AddLibraries,
            // Libraries
            library::LibraryResponse,
            library::CreateLibrary,
            library::UpdateLibrary,
            library::AddBooks,
            // Categories
            category::CategoryResponse,
            category::CreateCategory,
            category::UpdateCategory,
            // Users
            user::UserResponse,
            user::UserRentals,
            user::RentalBook,
            user::RentalLibrary,
            user::CreateUser,
            user::UpdateUser,
            user::AddUserBooks,
            // Pages
            pagination::AuthorPage,
            pagination::BookPage,
            pagination::BookWithAuthorPage,
            pagination::LibraryPage,
            pagination::CategoryPage,
            pagination::UserPage,
            pagination::UserRentalsPage,
            // Health
            health::HealthResponse,
            // Messages and errors
            crate::models::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management"),
        (name = "libraries", description = "Library management"),
        (name = "categories", description = "Category management"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
