//! Loan registry: creates loan records and answers which loan covers what

use std::collections::BTreeSet;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{loan::NewLoan, Borrower, Loan, Material},
    repository::CatalogTx,
};

pub struct LoanRegistry;

impl LoanRegistry {
    /// Persist a new active loan dated now. Availability is left untouched.
    pub async fn create_loan(
        tx: &mut dyn CatalogTx,
        borrower: &Borrower,
        materials: &[&Material],
    ) -> AppResult<Loan> {
        let mut material_ids: Vec<i32> = materials.iter().map(|m| m.id).collect();
        material_ids.sort_unstable();
        material_ids.dedup();

        tx.insert_loan(&NewLoan {
            borrower_id: borrower.id,
            created_at: Utc::now(),
            material_ids,
        })
        .await
    }

    /// Active loans of a borrower, oldest first. Empty means "nothing on loan".
    pub async fn active_loans_of(tx: &mut dyn CatalogTx, borrower_id: i32) -> AppResult<Vec<Loan>> {
        tx.find_loans_by_borrower_active(borrower_id).await
    }

    /// Materials still outstanding across the given loans
    pub async fn material_ids_across_loans(
        tx: &mut dyn CatalogTx,
        loan_ids: &[i32],
    ) -> AppResult<BTreeSet<i32>> {
        let loans = tx.find_loans_by_ids(loan_ids).await?;
        Ok(outstanding_ids(&loans))
    }

    /// Mark `material_id` returned on the oldest of `loan_ids` still holding it.
    ///
    /// No matching loan is a silent no-op; callers check membership first.
    pub async fn deactivate_loan_containing(
        tx: &mut dyn CatalogTx,
        loan_ids: &[i32],
        material_id: i32,
    ) -> AppResult<Option<Loan>> {
        let mut loans = tx.find_loans_by_ids(loan_ids).await?;
        let Some(loan) = mark_returned(&mut loans, material_id) else {
            return Ok(None);
        };
        tx.save_loan(loan).await?;
        Ok(Some(loan.clone()))
    }

    /// Every loan, active or not, that ever covered the material
    pub async fn loans_referencing_material(
        tx: &mut dyn CatalogTx,
        material_id: i32,
    ) -> AppResult<Vec<Loan>> {
        tx.find_loans_by_material(material_id).await
    }
}

fn outstanding_ids(loans: &[Loan]) -> BTreeSet<i32> {
    loans.iter().flat_map(|l| l.outstanding_material_ids()).collect()
}

/// Loans must be ordered oldest first; the first one holding the material wins.
fn mark_returned(loans: &mut [Loan], material_id: i32) -> Option<&mut Loan> {
    let loan = loans.iter_mut().find(|l| l.has_outstanding(material_id))?;

    let now = Utc::now();
    for line in loan.lines.iter_mut() {
        if line.material_id == material_id && line.is_outstanding() {
            line.returned_at = Some(now);
        }
    }
    loan.active = loan.lines.iter().any(|l| l.is_outstanding());
    Some(loan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanLine;
    use chrono::{Duration, Utc};

    fn loan(id: i32, days_ago: i64, material_ids: &[i32]) -> Loan {
        Loan {
            id,
            borrower_id: 1,
            created_at: Utc::now() - Duration::days(days_ago),
            active: true,
            lines: material_ids
                .iter()
                .map(|&material_id| LoanLine {
                    material_id,
                    returned_at: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_outstanding_ids_skip_returned_lines() {
        let mut first = loan(1, 2, &[10, 11]);
        first.lines[0].returned_at = Some(Utc::now());
        let second = loan(2, 1, &[11, 12]);

        let ids = outstanding_ids(&[first, second]);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![11, 12]);
    }

    #[test]
    fn test_mark_returned_only_touches_one_line() {
        let mut loans = vec![loan(1, 0, &[10, 11])];

        let updated = mark_returned(&mut loans, 10).unwrap();
        assert!(updated.active);
        assert!(!updated.has_outstanding(10));
        assert!(updated.has_outstanding(11));

        let updated = mark_returned(&mut loans, 11).unwrap();
        assert!(!updated.active);
    }

    #[test]
    fn test_mark_returned_picks_oldest_loan() {
        // Callers pass loans sorted by creation date
        let mut loans = vec![loan(7, 5, &[10]), loan(3, 1, &[10])];

        let updated = mark_returned(&mut loans, 10).unwrap();
        assert_eq!(updated.id, 7);
        assert!(loans[1].active);
    }

    #[test]
    fn test_mark_returned_without_match_is_noop() {
        let mut loans = vec![loan(1, 0, &[10])];
        assert!(mark_returned(&mut loans, 99).is_none());
        assert!(loans[0].active);
    }
}
