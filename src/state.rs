//! Shared application state for all routes.

use crate::service::FruitStore;
use crate::store::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub fruits: Arc<dyn FruitStore>,
}

impl AppState {
    pub fn new(fruits: Arc<dyn FruitStore>) -> Self {
        Self { fruits }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(db.fruits())
    }
}
