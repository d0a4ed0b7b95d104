//! Borrower queries

use super::PgTx;
use crate::{
    error::AppResult,
    models::{business_key, Borrower},
};

impl PgTx {
    pub(super) async fn borrower_by_id(&mut self, id: i32) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email FROM borrowers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(borrower)
    }

    pub(super) async fn borrower_by_name(&mut self, name: &str) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email FROM borrowers WHERE lower(name) = $1 ORDER BY id LIMIT 1",
        )
        .bind(business_key(name))
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(borrower)
    }

    pub(super) async fn borrowers_list(&mut self) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email FROM borrowers ORDER BY name",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(borrowers)
    }

    pub(super) async fn borrower_insert(&mut self, name: &str, email: &str) -> AppResult<Borrower> {
        let borrower = sqlx::query_as::<_, Borrower>(
            "INSERT INTO borrowers (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(name)
        .bind(email)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(borrower)
    }

    /// Past loans go with the borrower (ON DELETE CASCADE)
    pub(super) async fn borrower_delete(&mut self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM borrowers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
