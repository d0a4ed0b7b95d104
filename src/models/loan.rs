//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One material covered by a loan, with its own return state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanLine {
    pub material_id: i32,
    pub returned_at: Option<DateTime<Utc>>,
}

impl LoanLine {
    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// A borrower's loan over one or more materials.
///
/// `active` stays true while any line is outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub borrower_id: i32,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    pub lines: Vec<LoanLine>,
}

impl Loan {
    pub fn covers(&self, material_id: i32) -> bool {
        self.lines.iter().any(|l| l.material_id == material_id)
    }

    pub fn has_outstanding(&self, material_id: i32) -> bool {
        self.lines
            .iter()
            .any(|l| l.material_id == material_id && l.is_outstanding())
    }

    pub fn outstanding_material_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.lines
            .iter()
            .filter(|l| l.is_outstanding())
            .map(|l| l.material_id)
    }
}

/// Loan about to be inserted
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub borrower_id: i32,
    pub created_at: DateTime<Utc>,
    pub material_ids: Vec<i32>,
}

/// Loan as shown to callers, with business keys resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub borrower_name: String,
    pub titles: Vec<String>,
    pub active: bool,
}

/// Create loan request: one loan covering every listed title
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLoanRequest {
    #[validate(length(min = 1, message = "A loan needs at least one title"))]
    pub titles: Vec<String>,
    #[validate(length(min = 1, message = "Borrower name cannot be empty"))]
    pub borrower_name: String,
}

/// Return request, keyed by title and borrower name
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnLoanRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Borrower name cannot be empty"))]
    pub borrower_name: String,
}
