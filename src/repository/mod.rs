//! Catalog store: persistence for authors, materials, borrowers and loans.
//!
//! Every service operation opens one unit of work with [`CatalogStore::begin`],
//! runs its reads and writes through the returned [`CatalogTx`] and commits at
//! the end. Dropping a transaction without committing discards its writes.
//! Material rows read through a transaction stay locked until it ends, so
//! counter read-modify-write cycles are serialized per material.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        loan::NewLoan,
        material::NewMaterial,
        Author, Borrower, Loan, Material, MaterialKind,
    },
};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Entry point to the store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> AppResult<Box<dyn CatalogTx>>;

    /// Cheap connectivity probe used by the readiness endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// Finder and save/delete primitives scoped to one unit of work.
///
/// Lists of loans come back ordered by creation time, then id.
#[async_trait]
pub trait CatalogTx: Send {
    // Authors
    async fn find_author_by_id(&mut self, id: i32) -> AppResult<Option<Author>>;
    async fn find_author_by_name(&mut self, name: &str) -> AppResult<Option<Author>>;
    async fn list_authors(&mut self) -> AppResult<Vec<Author>>;
    async fn insert_author(&mut self, name: &str) -> AppResult<Author>;
    async fn update_author(&mut self, author: &Author) -> AppResult<()>;
    async fn delete_author(&mut self, id: i32) -> AppResult<()>;
    /// Books crediting the author
    async fn materials_by_author(&mut self, author_id: i32) -> AppResult<Vec<Material>>;

    // Materials
    async fn find_material_by_id(&mut self, id: i32) -> AppResult<Option<Material>>;
    /// Titles are not unique; the oldest match wins
    async fn find_material_by_title(&mut self, title: &str) -> AppResult<Option<Material>>;
    async fn find_book_by_isbn(&mut self, isbn: &str) -> AppResult<Option<Material>>;
    async fn list_materials(&mut self, kind: Option<MaterialKind>) -> AppResult<Vec<Material>>;
    async fn insert_material(&mut self, material: &NewMaterial) -> AppResult<Material>;
    async fn save_material(&mut self, material: &Material) -> AppResult<()>;
    /// Also prunes historic loan lines that referenced the material
    async fn delete_material(&mut self, id: i32) -> AppResult<()>;

    // Borrowers
    async fn find_borrower_by_id(&mut self, id: i32) -> AppResult<Option<Borrower>>;
    async fn find_borrower_by_name(&mut self, name: &str) -> AppResult<Option<Borrower>>;
    async fn list_borrowers(&mut self) -> AppResult<Vec<Borrower>>;
    async fn insert_borrower(&mut self, name: &str, email: &str) -> AppResult<Borrower>;
    /// Also removes the borrower's past loans
    async fn delete_borrower(&mut self, id: i32) -> AppResult<()>;

    // Loans
    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan>;
    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()>;
    async fn find_loans_by_ids(&mut self, ids: &[i32]) -> AppResult<Vec<Loan>>;
    async fn find_loans_by_borrower_active(&mut self, borrower_id: i32) -> AppResult<Vec<Loan>>;
    /// Loans covering the material, active or not
    async fn find_loans_by_material(&mut self, material_id: i32) -> AppResult<Vec<Loan>>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
