//! In-memory catalog store.
//!
//! A transaction holds the store mutex for its whole lifetime and works on a
//! copy of the state, which replaces the shared state on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{CatalogStore, CatalogTx};
use crate::{
    error::{AppError, AppResult},
    models::{
        business_key,
        loan::NewLoan,
        material::NewMaterial,
        Author, Borrower, Loan, LoanLine, Material, MaterialKind,
    },
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    authors: BTreeMap<i32, Author>,
    materials: BTreeMap<i32, Material>,
    borrowers: BTreeMap<i32, Borrower>,
    loans: BTreeMap<i32, Loan>,
    last_id: i32,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn begin(&self) -> AppResult<Box<dyn CatalogTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

fn ordered(mut loans: Vec<Loan>) -> Vec<Loan> {
    loans.sort_by_key(|l| (l.created_at, l.id));
    loans
}

#[async_trait]
impl CatalogTx for MemoryTx {
    async fn find_author_by_id(&mut self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.working.authors.get(&id).cloned())
    }

    async fn find_author_by_name(&mut self, name: &str) -> AppResult<Option<Author>> {
        let key = business_key(name);
        Ok(self
            .working
            .authors
            .values()
            .find(|a| business_key(&a.name) == key)
            .cloned())
    }

    async fn list_authors(&mut self) -> AppResult<Vec<Author>> {
        let mut authors: Vec<Author> = self.working.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    async fn insert_author(&mut self, name: &str) -> AppResult<Author> {
        let author = Author {
            id: self.working.next_id(),
            name: name.to_string(),
        };
        self.working.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(&mut self, author: &Author) -> AppResult<()> {
        match self.working.authors.get_mut(&author.id) {
            Some(row) => {
                *row = author.clone();
                Ok(())
            }
            None => Err(AppError::Internal(format!("Author {} vanished", author.id))),
        }
    }

    async fn delete_author(&mut self, id: i32) -> AppResult<()> {
        self.working.authors.remove(&id);
        Ok(())
    }

    async fn materials_by_author(&mut self, author_id: i32) -> AppResult<Vec<Material>> {
        Ok(self
            .working
            .materials
            .values()
            .filter(|m| m.author_ids().contains(&author_id))
            .cloned()
            .collect())
    }

    async fn find_material_by_id(&mut self, id: i32) -> AppResult<Option<Material>> {
        Ok(self.working.materials.get(&id).cloned())
    }

    async fn find_material_by_title(&mut self, title: &str) -> AppResult<Option<Material>> {
        let key = business_key(title);
        Ok(self
            .working
            .materials
            .values()
            .find(|m| business_key(&m.title) == key)
            .cloned())
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> AppResult<Option<Material>> {
        Ok(self
            .working
            .materials
            .values()
            .find(|m| {
                matches!(&m.details, crate::models::MaterialDetails::Book { isbn: i, .. } if i == isbn)
            })
            .cloned())
    }

    async fn list_materials(&mut self, kind: Option<MaterialKind>) -> AppResult<Vec<Material>> {
        let mut materials: Vec<Material> = self
            .working
            .materials
            .values()
            .filter(|m| kind.map_or(true, |k| m.kind() == k))
            .cloned()
            .collect();
        materials.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(materials)
    }

    async fn insert_material(&mut self, material: &NewMaterial) -> AppResult<Material> {
        let row = Material {
            id: self.working.next_id(),
            title: material.title.clone(),
            total: Some(material.total),
            available: Some(material.total),
            created_at: chrono::Utc::now(),
            details: material.details.clone(),
        };
        self.working.materials.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_material(&mut self, material: &Material) -> AppResult<()> {
        match self.working.materials.get_mut(&material.id) {
            Some(row) => {
                *row = material.clone();
                Ok(())
            }
            None => Err(AppError::Internal(format!("Material {} vanished", material.id))),
        }
    }

    async fn delete_material(&mut self, id: i32) -> AppResult<()> {
        self.working.materials.remove(&id);
        for loan in self.working.loans.values_mut() {
            loan.lines.retain(|l| l.material_id != id);
        }
        Ok(())
    }

    async fn find_borrower_by_id(&mut self, id: i32) -> AppResult<Option<Borrower>> {
        Ok(self.working.borrowers.get(&id).cloned())
    }

    async fn find_borrower_by_name(&mut self, name: &str) -> AppResult<Option<Borrower>> {
        let key = business_key(name);
        Ok(self
            .working
            .borrowers
            .values()
            .find(|b| business_key(&b.name) == key)
            .cloned())
    }

    async fn list_borrowers(&mut self) -> AppResult<Vec<Borrower>> {
        let mut borrowers: Vec<Borrower> = self.working.borrowers.values().cloned().collect();
        borrowers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(borrowers)
    }

    async fn insert_borrower(&mut self, name: &str, email: &str) -> AppResult<Borrower> {
        let borrower = Borrower {
            id: self.working.next_id(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.working.borrowers.insert(borrower.id, borrower.clone());
        Ok(borrower)
    }

    async fn delete_borrower(&mut self, id: i32) -> AppResult<()> {
        self.working.borrowers.remove(&id);
        self.working.loans.retain(|_, loan| loan.borrower_id != id);
        Ok(())
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        let row = Loan {
            id: self.working.next_id(),
            borrower_id: loan.borrower_id,
            created_at: loan.created_at,
            active: true,
            lines: loan
                .material_ids
                .iter()
                .map(|&material_id| LoanLine {
                    material_id,
                    returned_at: None,
                })
                .collect(),
        };
        self.working.loans.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save_loan(&mut self, loan: &Loan) -> AppResult<()> {
        match self.working.loans.get_mut(&loan.id) {
            Some(row) => {
                *row = loan.clone();
                Ok(())
            }
            None => Err(AppError::Internal(format!("Loan {} vanished", loan.id))),
        }
    }

    async fn find_loans_by_ids(&mut self, ids: &[i32]) -> AppResult<Vec<Loan>> {
        Ok(ordered(
            ids.iter()
                .filter_map(|id| self.working.loans.get(id).cloned())
                .collect(),
        ))
    }

    async fn find_loans_by_borrower_active(&mut self, borrower_id: i32) -> AppResult<Vec<Loan>> {
        Ok(ordered(
            self.working
                .loans
                .values()
                .filter(|l| l.borrower_id == borrower_id && l.active)
                .cloned()
                .collect(),
        ))
    }

    async fn find_loans_by_material(&mut self, material_id: i32) -> AppResult<Vec<Loan>> {
        Ok(ordered(
            self.working
                .loans
                .values()
                .filter(|l| l.covers(material_id))
                .cloned()
                .collect(),
        ))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
