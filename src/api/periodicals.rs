//! Periodical endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        material::{CreatePeriodical, UpdatePeriodical},
        Material,
    },
};

/// List periodicals
#[utoipa::path(
    get,
    path = "/periodicals",
    tag = "periodicals",
    responses(
        (status = 200, description = "All periodicals by title", body = Vec<Material>)
    )
)]
pub async fn list_periodicals(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Material>>> {
    let periodicals = state.services.catalog.list_periodicals().await?;
    Ok(Json(periodicals))
}

/// Get periodical by title
#[utoipa::path(
    get,
    path = "/periodicals/{title}",
    tag = "periodicals",
    params(
        ("title" = String, Path, description = "Periodical title")
    ),
    responses(
        (status = 200, description = "Periodical details", body = Material),
        (status = 404, description = "Periodical not found")
    )
)]
pub async fn get_periodical(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<Material>> {
    let periodical = state.services.catalog.get_periodical(&title).await?;
    Ok(Json(periodical))
}

/// Register a periodical
#[utoipa::path(
    post,
    path = "/periodicals",
    tag = "periodicals",
    request_body = CreatePeriodical,
    responses(
        (status = 201, description = "Periodical created", body = Material),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_periodical(
    State(state): State<crate::AppState>,
    Json(request): Json<CreatePeriodical>,
) -> AppResult<(StatusCode, Json<Material>)> {
    request.validate()?;

    let periodical = state.services.catalog.create_periodical(request).await?;
    Ok((StatusCode::CREATED, Json(periodical)))
}

/// Update a periodical
#[utoipa::path(
    put,
    path = "/periodicals/{title}",
    tag = "periodicals",
    params(
        ("title" = String, Path, description = "Current periodical title")
    ),
    request_body = UpdatePeriodical,
    responses(
        (status = 200, description = "Periodical updated", body = Material),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Periodical not found")
    )
)]
pub async fn update_periodical(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
    Json(request): Json<UpdatePeriodical>,
) -> AppResult<Json<Material>> {
    request.validate()?;

    let periodical = state.services.catalog.update_periodical(&title, request).await?;
    Ok(Json(periodical))
}

/// Delete a periodical with every copy in
#[utoipa::path(
    delete,
    path = "/periodicals/{title}",
    tag = "periodicals",
    params(
        ("title" = String, Path, description = "Periodical title")
    ),
    responses(
        (status = 204, description = "Periodical deleted"),
        (status = 404, description = "Periodical not found"),
        (status = 409, description = "Periodical is on loan")
    )
)]
pub async fn delete_periodical(
    State(state): State<crate::AppState>,
    Path(title): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_periodical(&title).await?;
    Ok(StatusCode::NO_CONTENT)
}
