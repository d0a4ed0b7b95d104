//! PostgreSQL catalog store

mod authors;
mod borrowers;
mod loans;
mod materials;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use super::{CatalogStore, CatalogTx};
use crate::{
    error::{AppError, AppResult},
    models::{
        loan::NewLoan,
        material::NewMaterial,
        Author, Borrower, Loan, Material, MaterialKind,
    },
};

/// Store backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: Pool<Postgres>,
}

impl PgCatalogStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin(&self) -> AppResult<Box<dyn CatalogTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// One database transaction. Entity-specific queries live in the sibling
/// modules as inherent methods.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogTx for PgTx {
    async fn find_author_by_id(&mut self, id: i32) -> AppResult<Option<Author>> {
        self.author_by_id(id).await
    }

    async fn find_author_by_name(&mut self, name: &str) -> AppResult<Option<Author>> {
        self.author_by_name(name).await
    }

    async fn list_authors(&mut self) -> AppResult<Vec<Author>> {
        self.authors_list().await
    }

    async fn insert_author(&mut self, name: &str) -> AppResult<Author> {
        self.author_insert(name).await
    }

    async fn update_author(&mut self, author: &Author) -> AppResult<()> {
        self.author_update(author).await
    }

    async fn delete_author(&mut self, id: i32) -> AppResult<()> {
        self.author_delete(id).await
    }

    async fn materials_by_author(&mut self, author_id: i32) -> AppResult<Vec<Material>> {
        self.materials_by_author_id(author_id).await
    }

    async fn find_material_by_id(&mut self, id: i32) -> AppResult<Option<Material>> {
        self.material_by_id(id).await
    }

    async fn find_material_by_title(&mut self, title: &str) -> AppResult<Option<Material>> {
        self.material_by_title(title).await
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> AppResult<Option<Material>> {
        self.book_by_isbn(isbn).await
    }

    async fn list_materials(&mut self, kind: Option<MaterialKind>) -> AppResult<Vec<Material>> {
        self.materials_list(kind).await
    }

    async fn insert_material(&mut self, material: &NewMaterial) -> AppResult<Material> {
        self.material_insert(material).await
    }

    async fn save_material(&mut self, material: &Material) -> AppResult<()> {
        self.material_save(material).await
    }

    async fn delete_material(&mut self, id: i32) -> AppResult<()> {
        self.material_delete(id).await
    }

    async fn find_borrower_by_id(&mut self, id: i32) -> AppResult<Option<Borrower>> {
        self.borrower_by_id(id).await
    }

    async fn find_borrower_by_name(&mut self, name: &str) -> AppResult<Option<Borrower>> {
        self.borrower_by_name(name).await
    }

    async fn list_borrowers(&mut self) -> AppResult<Vec<Borrower>> {
        self.borrowers_list().await
    }

    async fn insert_borrower(&mut self, name: &str, email: &str) -> AppResult<Borrower> {
        self.borrower_insert(name, email).await
    }

    async fn delete_borrower(&mut self, id: i32) -> AppResult<()> {
        self.borrower_delete(id).await
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        self.loan_insert(loan).await
    }

    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()> {
        self.loan_save(loan).await
    }

    async fn find_loans_by_ids(&mut self, ids: &[i32]) -> AppResult<Vec<Loan>> {
        self.loans_by_ids(ids).await
    }

    async fn find_loans_by_borrower_active(&mut self, borrower_id: i32) -> AppResult<Vec<Loan>> {
        self.loans_by_borrower_active(borrower_id).await
    }

    async fn find_loans_by_material(&mut self, material_id: i32) -> AppResult<Vec<Loan>> {
        self.loans_by_material(material_id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
