//! Loan endpoints: lend, return and holder lookup by title

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoanRequest, ReturnLoanRequest},
        Loan,
    },
};

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Confirmation message
    pub message: String,
    pub title: String,
    pub borrower_name: String,
}

/// Borrowers currently holding a title
#[derive(Serialize, ToSchema)]
pub struct HoldersResponse {
    pub title: String,
    pub borrowers: Vec<String>,
}

/// Lend one copy of each listed material to a borrower, as one loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Material or borrower not found"),
        (status = 409, description = "A listed material has no copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    request.validate()?;

    let titles: Vec<&str> = request.titles.iter().map(String::as_str).collect();
    let loan = state
        .services
        .lending
        .create_loan(&titles, &request.borrower_name)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return one copy of a material
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Material returned", body = ReturnResponse),
        (status = 404, description = "Material or borrower not found"),
        (status = 422, description = "Material not on loan to this borrower")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<ReturnLoanRequest>,
) -> AppResult<Json<ReturnResponse>> {
    request.validate()?;

    let message = state
        .services
        .lending
        .return_loan(&request.title, &request.borrower_name)
        .await?;

    Ok(Json(ReturnResponse {
        message: message.to_string(),
        title: request.title,
        borrower_name: request.borrower_name,
    }))
}

/// Who has a material on loan
#[utoipa::path(
    get,
    path = "/loans/holders/{title}",
    tag = "loans",
    params(
        ("title" = String, Path, description = "Material title")
    ),
    responses(
        (status = 200, description = "Current holders", body = HoldersResponse),
        (status = 404, description = "Material not found"),
        (status = 422, description = "Material not on loan")
    )
)]
pub async fn who_has_on_loan(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<HoldersResponse>> {
    let borrowers = state.services.lending.who_has_on_loan(&title).await?;
    Ok(Json(HoldersResponse { title, borrowers }))
}
