//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{AuthorDetails, AuthorRequest},
        Author,
    },
};

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "All authors by name", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author by name, with the titles of their books
#[utoipa::path(
    get,
    path = "/authors/{name}",
    tag = "authors",
    params(
        ("name" = String, Path, description = "Author name")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author(&name).await?;
    Ok(Json(author))
}

/// Create author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid or duplicate name")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Json(request): Json<AuthorRequest>,
) -> AppResult<(StatusCode, Json<Author>)> {
    request.validate()?;

    let author = state.services.catalog.create_author(&request.name).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Rename author
#[utoipa::path(
    put,
    path = "/authors/{name}",
    tag = "authors",
    params(
        ("name" = String, Path, description = "Current author name")
    ),
    request_body = AuthorRequest,
    responses(
        (status = 200, description = "Author renamed", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn rename_author(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
    Json(request): Json<AuthorRequest>,
) -> AppResult<Json<Author>> {
    request.validate()?;

    let author = state.services.catalog.rename_author(&name, &request.name).await?;
    Ok(Json(author))
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{name}",
    tag = "authors",
    params(
        ("name" = String, Path, description = "Author name")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
