//! Borrower management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{borrower::CreateBorrower, Borrower, LoanDetails},
};

/// List borrowers
#[utoipa::path(
    get,
    path = "/borrowers",
    tag = "borrowers",
    responses(
        (status = 200, description = "All borrowers by name", body = Vec<Borrower>)
    )
)]
pub async fn list_borrowers(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Borrower>>> {
    let borrowers = state.services.borrowers.list_borrowers().await?;
    Ok(Json(borrowers))
}

/// Get borrower by name
#[utoipa::path(
    get,
    path = "/borrowers/{name}",
    tag = "borrowers",
    params(
        ("name" = String, Path, description = "Borrower name")
    ),
    responses(
        (status = 200, description = "Borrower details", body = Borrower),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn get_borrower(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Borrower>> {
    let borrower = state.services.borrowers.get_borrower(&name).await?;
    Ok(Json(borrower))
}

/// Register a borrower
#[utoipa::path(
    post,
    path = "/borrowers",
    tag = "borrowers",
    request_body = CreateBorrower,
    responses(
        (status = 201, description = "Borrower created", body = Borrower),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_borrower(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBorrower>,
) -> AppResult<(StatusCode, Json<Borrower>)> {
    request.validate()?;

    let borrower = state.services.borrowers.create_borrower(request).await?;
    Ok((StatusCode::CREATED, Json(borrower)))
}

/// Delete a borrower with nothing on loan
#[utoipa::path(
    delete,
    path = "/borrowers/{name}",
    tag = "borrowers",
    params(
        ("name" = String, Path, description = "Borrower name")
    ),
    responses(
        (status = 204, description = "Borrower deleted"),
        (status = 404, description = "Borrower not found"),
        (status = 409, description = "Borrower has active loans")
    )
)]
pub async fn delete_borrower(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    state.services.borrowers.delete_borrower(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active loans of a borrower
#[utoipa::path(
    get,
    path = "/borrowers/{name}/loans",
    tag = "borrowers",
    params(
        ("name" = String, Path, description = "Borrower name")
    ),
    responses(
        (status = 200, description = "Borrower's active loans", body = Vec<LoanDetails>),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn get_borrower_loans(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.lending.loans_of_borrower(&name).await?;
    Ok(Json(loans))
}
