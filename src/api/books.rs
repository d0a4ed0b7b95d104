//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        material::{CreateBook, UpdateBook},
        Material,
    },
};

/// Query parameters for the book list
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Only the book with this ISBN
    pub isbn: Option<String>,
}

/// List books, optionally narrowed to one ISBN
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books by title, or the book matching the ISBN", body = Vec<Material>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Material>>> {
    let books: Vec<Material> = match query.isbn {
        Some(isbn) => state.services.catalog.find_book_by_isbn(&isbn).await?.into_iter().collect(),
        None => state.services.catalog.list_books().await?,
    };
    Ok(Json(books))
}

/// Get book by title
#[utoipa::path(
    get,
    path = "/books/{title}",
    tag = "books",
    params(
        ("title" = String, Path, description = "Book title")
    ),
    responses(
        (status = 200, description = "Book details", body = Material),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<Material>> {
    let book = state.services.catalog.get_book(&title).await?;
    Ok(Json(book))
}

/// Register a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Material),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Material>)> {
    request.validate()?;

    let book = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{title}",
    tag = "books",
    params(
        ("title" = String, Path, description = "Current book title")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Material),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book or author not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Material>> {
    request.validate()?;

    let book = state.services.catalog.update_book(&title, request).await?;
    Ok(Json(book))
}

/// Delete a book with every copy in
#[utoipa::path(
    delete,
    path = "/books/{title}",
    tag = "books",
    params(
        ("title" = String, Path, description = "Book title")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is on loan")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&title).await?;
    Ok(StatusCode::NO_CONTENT)
}
