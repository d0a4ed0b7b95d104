//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric codes reported in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchBorrower = 4,
    NoSuchMaterial = 5,
    NoSuchAuthor = 6,
    OutOfStock = 7,
    NotOnLoan = 8,
    NoActiveLoans = 9,
    NotBorrowedByThisUser = 10,
    NoActiveLoanRecord = 11,
    HasDependentMaterials = 12,
    HasActiveLoans = 13,
    CurrentlyOnLoan = 14,
    InventoryOverflow = 15,
    BadValue = 18,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Author '{0}' not found")]
    AuthorNotFound(String),

    #[error("Material '{0}' not found")]
    MaterialNotFound(String),

    #[error("Borrower '{0}' not found")]
    BorrowerNotFound(String),

    #[error("'{title}' has no copies available")]
    OutOfStock { title: String },

    #[error("'{title}' is not on loan")]
    NotOnLoan { title: String },

    #[error("Borrower '{borrower}' has no active loans")]
    NoActiveLoans { borrower: String },

    #[error("Borrower '{borrower}' does not have '{title}' on loan")]
    NotBorrowedByThisUser { borrower: String, title: String },

    /// Counters say the material is out but no loan line explains it
    #[error("'{title}' is counted as on loan but no active loan references it")]
    NoActiveLoanRecord { title: String },

    #[error("Author '{author}' cannot be deleted: they still have books in the library")]
    HasDependentMaterials { author: String },

    #[error("Borrower '{borrower}' cannot be deleted: they still have material on loan")]
    HasActiveLoans { borrower: String },

    #[error("'{title}' cannot be deleted: it is on loan")]
    CurrentlyOnLoan { title: String },

    #[error("Returning '{title}' would exceed its {total} copies")]
    InventoryOverflow { title: String, total: i32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::AuthorNotFound(_) => ErrorCode::NoSuchAuthor,
            AppError::MaterialNotFound(_) => ErrorCode::NoSuchMaterial,
            AppError::BorrowerNotFound(_) => ErrorCode::NoSuchBorrower,
            AppError::OutOfStock { .. } => ErrorCode::OutOfStock,
            AppError::NotOnLoan { .. } => ErrorCode::NotOnLoan,
            AppError::NoActiveLoans { .. } => ErrorCode::NoActiveLoans,
            AppError::NotBorrowedByThisUser { .. } => ErrorCode::NotBorrowedByThisUser,
            AppError::NoActiveLoanRecord { .. } => ErrorCode::NoActiveLoanRecord,
            AppError::HasDependentMaterials { .. } => ErrorCode::HasDependentMaterials,
            AppError::HasActiveLoans { .. } => ErrorCode::HasActiveLoans,
            AppError::CurrentlyOnLoan { .. } => ErrorCode::CurrentlyOnLoan,
            AppError::InventoryOverflow { .. } => ErrorCode::InventoryOverflow,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Lower-layer failures, as opposed to business rule rejections
    pub fn is_unexpected(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::AuthorNotFound(_)
            | AppError::MaterialNotFound(_)
            | AppError::BorrowerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::OutOfStock { .. }
            | AppError::HasDependentMaterials { .. }
            | AppError::HasActiveLoans { .. }
            | AppError::CurrentlyOnLoan { .. } => StatusCode::CONFLICT,
            AppError::NotOnLoan { .. }
            | AppError::NoActiveLoans { .. }
            | AppError::NotBorrowedByThisUser { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoActiveLoanRecord { .. }
            | AppError::InventoryOverflow { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_name_the_entity() {
        let err = AppError::NotBorrowedByThisUser {
            borrower: "ANA".to_string(),
            title: "El Quijote".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("ANA"));
        assert!(message.contains("El Quijote"));
        assert_eq!(err.code(), ErrorCode::NotBorrowedByThisUser);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::MaterialNotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::OutOfStock { title: "x".into() }.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotOnLoan { title: "x".into() }.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unexpected_classification() {
        assert!(AppError::Internal("x".into()).is_unexpected());
        assert!(AppError::Database(sqlx::Error::RowNotFound).is_unexpected());
        assert!(!AppError::CurrentlyOnLoan { title: "x".into() }.is_unexpected());
    }

    #[tokio::test]
    async fn test_unexpected_errors_are_reported_without_details() {
        let response = AppError::Internal("pool timed out".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["error"], "Failure");
    }
}
