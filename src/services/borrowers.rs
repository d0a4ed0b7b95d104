//! Borrower management service

use std::sync::Arc;

use super::{guard, lending::borrower_by_name, loans::LoanRegistry};
use crate::{
    error::{AppError, AppResult},
    models::{borrower::CreateBorrower, Borrower},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct BorrowersService {
    store: Arc<dyn CatalogStore>,
}

impl BorrowersService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create_borrower(&self, request: CreateBorrower) -> AppResult<Borrower> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Borrower name cannot be empty".to_string()));
        }
        let email = request.email.trim();

        let mut tx = self.store.begin().await?;
        if tx.find_borrower_by_name(name).await?.is_some() {
            return Err(AppError::Validation(format!("Borrower '{}' already exists", name)));
        }
        let borrower = tx.insert_borrower(name, email).await?;
        tx.commit().await?;
        tracing::info!(borrower_id = borrower.id, "Borrower created");
        Ok(borrower)
    }

    pub async fn get_borrower(&self, name: &str) -> AppResult<Borrower> {
        let mut tx = self.store.begin().await?;
        let borrower = borrower_by_name(&mut *tx, name).await?;
        Ok(borrower)
    }

    pub async fn list_borrowers(&self) -> AppResult<Vec<Borrower>> {
        let mut tx = self.store.begin().await?;
        let borrowers = tx.list_borrowers().await?;
        Ok(borrowers)
    }

    /// Delete a borrower with nothing on loan. Their loan history goes too.
    pub async fn delete_borrower(&self, name: &str) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let borrower = borrower_by_name(&mut *tx, name).await?;
        let active = LoanRegistry::active_loans_of(&mut *tx, borrower.id).await?;
        guard::can_delete_borrower(&borrower, &active)?;

        tx.delete_borrower(borrower.id).await?;
        tx.commit().await?;
        tracing::info!(borrower_id = borrower.id, "Borrower deleted");
        Ok(())
    }
}
