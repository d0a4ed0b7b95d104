//! Lending engine: loan creation and return as single units of work

use std::sync::Arc;

use super::{inventory::InventoryLedger, loans::LoanRegistry};
use crate::{
    error::{AppError, AppResult},
    models::{Borrower, Loan, LoanDetails, Material},
    repository::{CatalogStore, CatalogTx},
};

/// Confirmation returned by a successful return
pub const LOAN_RETURNED: &str = "Loan returned";

#[derive(Clone)]
pub struct LendingEngine {
    store: Arc<dyn CatalogStore>,
}

impl LendingEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Lend one copy of each of `titles` to `borrower_name` under a single loan.
    ///
    /// Every title must have a copy in; otherwise nothing is lent.
    pub async fn create_loan(&self, titles: &[&str], borrower_name: &str) -> AppResult<Loan> {
        let mut tx = self.store.begin().await?;
        let loan = create_loan_in(&mut *tx, titles, borrower_name).await?;
        tx.commit().await?;
        Ok(loan)
    }

    /// Take back one copy of `title` from `borrower_name`
    pub async fn return_loan(&self, title: &str, borrower_name: &str) -> AppResult<&'static str> {
        let mut tx = self.store.begin().await?;
        return_loan_in(&mut *tx, title, borrower_name).await?;
        tx.commit().await?;
        Ok(LOAN_RETURNED)
    }

    /// Names of the borrowers currently holding a copy of `title`
    pub async fn who_has_on_loan(&self, title: &str) -> AppResult<Vec<String>> {
        let mut tx = self.store.begin().await?;
        let tx = &mut *tx;

        let material = material_by_title(tx, title).await?;
        require_on_loan(&material)?;

        let holders: Vec<Loan> = LoanRegistry::loans_referencing_material(tx, material.id)
            .await?
            .into_iter()
            .filter(|l| l.has_outstanding(material.id))
            .collect();
        if holders.is_empty() {
            tracing::warn!(material_id = material.id, title, "Counters say on loan but no loan holds it");
            return Err(AppError::NoActiveLoanRecord {
                title: material.title,
            });
        }

        let mut names = Vec::with_capacity(holders.len());
        for loan in &holders {
            names.push(borrower_by_id(tx, loan.borrower_id).await?.name);
        }
        Ok(names)
    }

    /// Active loans of a borrower with the titles still out on each
    pub async fn loans_of_borrower(&self, borrower_name: &str) -> AppResult<Vec<LoanDetails>> {
        let mut tx = self.store.begin().await?;
        let tx = &mut *tx;

        let borrower = borrower_by_name(tx, borrower_name).await?;
        let loans = LoanRegistry::active_loans_of(tx, borrower.id).await?;

        let mut details = Vec::with_capacity(loans.len());
        for loan in loans {
            let mut titles = Vec::new();
            for material_id in loan.outstanding_material_ids() {
                if let Some(material) = tx.find_material_by_id(material_id).await? {
                    titles.push(material.title);
                }
            }
            details.push(LoanDetails {
                id: loan.id,
                created_at: loan.created_at,
                borrower_name: borrower.name.clone(),
                titles,
                active: loan.active,
            });
        }
        Ok(details)
    }
}

async fn create_loan_in(tx: &mut dyn CatalogTx, titles: &[&str], borrower_name: &str) -> AppResult<Loan> {
    if titles.is_empty() {
        return Err(AppError::Validation("A loan needs at least one title".to_string()));
    }

    // Repeated titles, in any spelling of the key, lend a single copy
    let mut materials: Vec<Material> = Vec::with_capacity(titles.len());
    for title in titles {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        let material = material_by_title(tx, title).await?;
        if materials.iter().any(|m| m.id == material.id) {
            continue;
        }
        if !matches!(material.available, Some(available) if available > 0) {
            return Err(AppError::OutOfStock {
                title: material.title,
            });
        }
        materials.push(material);
    }

    let borrower = borrower_by_name(tx, borrower_name).await?;
    let lent: Vec<&Material> = materials.iter().collect();
    let loan = LoanRegistry::create_loan(tx, &borrower, &lent).await?;
    for material in &mut materials {
        InventoryLedger::decrement_available(tx, material).await?;
    }

    tracing::info!(
        loan_id = loan.id,
        material_ids = ?loan.lines.iter().map(|l| l.material_id).collect::<Vec<_>>(),
        borrower_id = borrower.id,
        "Loan created"
    );
    Ok(loan)
}

async fn return_loan_in(tx: &mut dyn CatalogTx, title: &str, borrower_name: &str) -> AppResult<()> {
    let mut material = material_by_title(tx, title).await?;
    require_on_loan(&material)?;

    let borrower = borrower_by_name(tx, borrower_name).await?;
    let active = LoanRegistry::active_loans_of(tx, borrower.id).await?;
    if active.is_empty() {
        return Err(AppError::NoActiveLoans {
            borrower: borrower.name,
        });
    }

    let loan_ids: Vec<i32> = active.iter().map(|l| l.id).collect();
    let covered = LoanRegistry::material_ids_across_loans(tx, &loan_ids).await?;
    if !covered.contains(&material.id) {
        return Err(AppError::NotBorrowedByThisUser {
            borrower: borrower.name,
            title: material.title,
        });
    }

    InventoryLedger::increment_available(tx, &mut material).await?;
    let loan = LoanRegistry::deactivate_loan_containing(tx, &loan_ids, material.id).await?;

    tracing::info!(
        loan_id = ?loan.as_ref().map(|l| l.id),
        loan_active = ?loan.as_ref().map(|l| l.active),
        material_id = material.id,
        borrower_id = borrower.id,
        "Loan returned"
    );
    Ok(())
}

fn require_on_loan(material: &Material) -> AppResult<()> {
    if InventoryLedger::is_on_loan(material) {
        Ok(())
    } else {
        Err(AppError::NotOnLoan {
            title: material.title.clone(),
        })
    }
}

pub(super) async fn material_by_title(tx: &mut dyn CatalogTx, title: &str) -> AppResult<Material> {
    tx.find_material_by_title(title)
        .await?
        .ok_or_else(|| AppError::MaterialNotFound(title.trim().to_string()))
}

pub(super) async fn borrower_by_name(tx: &mut dyn CatalogTx, name: &str) -> AppResult<Borrower> {
    tx.find_borrower_by_name(name)
        .await?
        .ok_or_else(|| AppError::BorrowerNotFound(name.trim().to_string()))
}

async fn borrower_by_id(tx: &mut dyn CatalogTx, id: i32) -> AppResult<Borrower> {
    tx.find_borrower_by_id(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Loan references missing borrower {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogStore;

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unexpected() {
        let mut store = MockCatalogStore::new();
        store
            .expect_begin()
            .times(1)
            .returning(|| Err(AppError::Internal("connection refused".to_string())));

        let engine = LendingEngine::new(Arc::new(store));
        let err = engine.create_loan(&["Rayuela"], "ANA").await.unwrap_err();
        assert!(err.is_unexpected());
    }

    #[tokio::test]
    async fn test_loan_without_titles_is_rejected() {
        let engine = LendingEngine::new(Arc::new(crate::repository::MemoryCatalogStore::new()));
        let err = engine.create_loan(&[], "ANA").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_material_is_reported_by_title() {
        let engine = LendingEngine::new(Arc::new(crate::repository::MemoryCatalogStore::new()));
        let err = engine.return_loan("Rayuela", "ANA").await.unwrap_err();
        assert!(matches!(err, AppError::MaterialNotFound(title) if title == "Rayuela"));
    }
}
