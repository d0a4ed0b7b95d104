//! Borrower model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Library member who can hold loans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrower {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Create borrower request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBorrower {
    #[validate(length(min = 1, message = "Borrower name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
