//! Business logic services

pub mod borrowers;
pub mod catalog;
pub mod guard;
pub mod inventory;
pub mod lending;
pub mod loans;

use std::sync::Arc;

use crate::{error::AppResult, repository::CatalogStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub borrowers: borrowers::BorrowersService,
    pub lending: lending::LendingEngine,
    store: Arc<dyn CatalogStore>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            borrowers: borrowers::BorrowersService::new(store.clone()),
            lending: lending::LendingEngine::new(store.clone()),
            store,
        }
    }

    /// Readiness probe against the store
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
