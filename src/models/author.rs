//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author row. The books an author wrote are not stored here; they are
/// looked up through `CatalogTx::materials_by_author`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

/// Author with the titles of their books
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    pub id: i32,
    pub name: String,
    pub book_titles: Vec<String>,
}

/// Create or rename author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorRequest {
    #[validate(length(min = 1, message = "Author name cannot be empty"))]
    pub name: String,
}
