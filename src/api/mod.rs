//! API handlers for the circulation REST endpoints

pub mod authors;
pub mod books;
pub mod borrowers;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod periodicals;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

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
            "/authors/:name",
            get(authors::get_author)
                .put(authors::rename_author)
                .delete(authors::delete_author),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:title",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Periodicals
        .route(
            "/periodicals",
            get(periodicals::list_periodicals).post(periodicals::create_periodical),
        )
        .route(
            "/periodicals/:title",
            get(periodicals::get_periodical)
                .put(periodicals::update_periodical)
                .delete(periodicals::delete_periodical),
        )
        // Borrowers
        .route(
            "/borrowers",
            get(borrowers::list_borrowers).post(borrowers::create_borrower),
        )
        .route(
            "/borrowers/:name",
            get(borrowers::get_borrower).delete(borrowers::delete_borrower),
        )
        .route("/borrowers/:name/loans", get(borrowers::get_borrower_loans))
        // Loans
        .route("/loans", post(loans::create_loan))
        .route("/loans/return", post(loans::return_loan))
        .route("/loans/holders/:title", get(loans::who_has_on_loan))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
