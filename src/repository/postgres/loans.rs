//! Loan queries

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::PgTx;
use crate::{
    error::{AppError, AppResult},
    models::{loan::NewLoan, Loan, LoanLine},
};

#[derive(FromRow)]
struct LoanRow {
    id: i32,
    borrower_id: i32,
    created_at: DateTime<Utc>,
    active: bool,
}

#[derive(FromRow)]
struct LoanLineRow {
    loan_id: i32,
    material_id: i32,
    returned_at: Option<DateTime<Utc>>,
}

impl PgTx {
    /// Attach material lines to loan rows, keeping row order
    async fn hydrate_loans(&mut self, rows: Vec<LoanRow>) -> AppResult<Vec<Loan>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let lines = sqlx::query_as::<_, LoanLineRow>(
            "SELECT loan_id, material_id, returned_at FROM loan_materials \
             WHERE loan_id = ANY($1) ORDER BY loan_id, material_id",
        )
        .bind(&ids[..])
        .fetch_all(&mut *self.tx)
        .await?;

        let mut by_loan: HashMap<i32, Vec<LoanLine>> = HashMap::new();
        for line in lines {
            by_loan.entry(line.loan_id).or_default().push(LoanLine {
                material_id: line.material_id,
                returned_at: line.returned_at,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Loan {
                lines: by_loan.remove(&row.id).unwrap_or_default(),
                id: row.id,
                borrower_id: row.borrower_id,
                created_at: row.created_at,
                active: row.active,
            })
            .collect())
    }

    pub(super) async fn loan_insert(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        let row = sqlx::query_as::<_, LoanRow>(
            r#"
            INSERT INTO loans (borrower_id, created_at, active)
            VALUES ($1, $2, TRUE)
            RETURNING id, borrower_id, created_at, active
            "#,
        )
        .bind(loan.borrower_id)
        .bind(loan.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        for material_id in &loan.material_ids {
            sqlx::query("INSERT INTO loan_materials (loan_id, material_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(*material_id)
                .execute(&mut *self.tx)
                .await?;
        }

        self.hydrate_loans(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Inserted loan not returned".to_string()))
    }

    pub(super) async fn loan_save(&mut self, loan: &Loan) -> AppResult<()> {
        let result = sqlx::query("UPDATE loans SET active = $1 WHERE id = $2")
            .bind(loan.active)
            .bind(loan.id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!("Loan {} vanished", loan.id)));
        }

        for line in &loan.lines {
            sqlx::query(
                "UPDATE loan_materials SET returned_at = $1 WHERE loan_id = $2 AND material_id = $3",
            )
            .bind(line.returned_at)
            .bind(loan.id)
            .bind(line.material_id)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    pub(super) async fn loans_by_ids(&mut self, ids: &[i32]) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT id, borrower_id, created_at, active FROM loans \
             WHERE id = ANY($1) ORDER BY created_at, id",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;
        self.hydrate_loans(rows).await
    }

    pub(super) async fn loans_by_borrower_active(&mut self, borrower_id: i32) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT id, borrower_id, created_at, active FROM loans \
             WHERE borrower_id = $1 AND active ORDER BY created_at, id",
        )
        .bind(borrower_id)
        .fetch_all(&mut *self.tx)
        .await?;
        self.hydrate_loans(rows).await
    }

    pub(super) async fn loans_by_material(&mut self, material_id: i32) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT l.id, l.borrower_id, l.created_at, l.active
            FROM loans l
            WHERE EXISTS (
                SELECT 1 FROM loan_materials lm
                WHERE lm.loan_id = l.id AND lm.material_id = $1
            )
            ORDER BY l.created_at, l.id
            "#,
        )
        .bind(material_id)
        .fetch_all(&mut *self.tx)
        .await?;
        self.hydrate_loans(rows).await
    }
}
