//! Deletion guard: pure checks over already-loaded state

use crate::{
    error::{AppError, AppResult},
    models::{Author, Borrower, Loan, Material},
};

/// An author can go only once no material credits them
pub fn can_delete_author(author: &Author, materials: &[Material]) -> AppResult<()> {
    if materials.is_empty() {
        Ok(())
    } else {
        Err(AppError::HasDependentMaterials {
            author: author.name.clone(),
        })
    }
}

/// A material can go only when every copy is back on the shelf
pub fn can_delete_material(material: &Material) -> AppResult<()> {
    if material.available == material.total {
        Ok(())
    } else {
        Err(AppError::CurrentlyOnLoan {
            title: material.title.clone(),
        })
    }
}

/// `active_loans` is the result of `LoanRegistry::active_loans_of`
pub fn can_delete_borrower(borrower: &Borrower, active_loans: &[Loan]) -> AppResult<()> {
    if active_loans.is_empty() {
        Ok(())
    } else {
        Err(AppError::HasActiveLoans {
            borrower: borrower.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaterialDetails;
    use chrono::Utc;
    use tokio_test::{assert_err, assert_ok};

    fn periodical(total: Option<i32>, available: Option<i32>) -> Material {
        Material {
            id: 4,
            title: "Semana".to_string(),
            total,
            available,
            created_at: Utc::now(),
            details: MaterialDetails::Periodical {
                edition_number: 3,
                recurrence: "weekly".to_string(),
            },
        }
    }

    #[test]
    fn test_material_deletable_iff_all_copies_in() {
        assert_ok!(can_delete_material(&periodical(Some(5), Some(5))));
        assert_ok!(can_delete_material(&periodical(None, None)));

        let err = assert_err!(can_delete_material(&periodical(Some(5), Some(3))));
        assert!(matches!(err, AppError::CurrentlyOnLoan { title } if title == "Semana"));
    }

    #[test]
    fn test_author_with_books_is_kept() {
        let author = Author {
            id: 1,
            name: "Isabel Allende".to_string(),
        };
        assert_ok!(can_delete_author(&author, &[]));

        let err = assert_err!(can_delete_author(&author, &[periodical(Some(1), Some(1))]));
        assert!(matches!(err, AppError::HasDependentMaterials { .. }));
    }

    #[test]
    fn test_borrower_with_active_loans_is_kept() {
        let borrower = Borrower {
            id: 2,
            name: "Lucía".to_string(),
            email: "lucia@example.org".to_string(),
        };
        assert_ok!(can_delete_borrower(&borrower, &[]));

        let loan = Loan {
            id: 9,
            borrower_id: 2,
            created_at: Utc::now(),
            active: true,
            lines: Vec::new(),
        };
        let err = assert_err!(can_delete_borrower(&borrower, &[loan]));
        assert!(matches!(err, AppError::HasActiveLoans { .. }));
    }
}
