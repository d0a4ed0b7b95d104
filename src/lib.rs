//! Circulation server
//!
//! Inventory and loan bookkeeping for a lending library, exposed as a REST
//! JSON API over books, periodicals, authors and borrowers.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
