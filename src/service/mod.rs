//! Fruit persistence behind one trait so handlers never see the backend.

mod crud;
mod memory;
pub use crud::PgFruitStore;
pub use memory::MemoryFruitStore;

use crate::error::AppError;
use crate::model::{Fruit, FruitDoc};
use async_trait::async_trait;
use uuid::Uuid;

/// Operations the router performs against the fruits collection.
///
/// Lookups that miss return `Ok(None)`; `Err` is reserved for store failures.
#[async_trait]
pub trait FruitStore: Send + Sync + 'static {
    /// Remove every fruit, then insert `docs` in order. Returns the created fruits.
    async fn seed(&self, docs: Vec<FruitDoc>) -> Result<Vec<Fruit>, AppError>;

    /// All fruits in insertion order.
    async fn list(&self) -> Result<Vec<Fruit>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Fruit>, AppError>;

    async fn create(&self, doc: FruitDoc) -> Result<Fruit, AppError>;

    /// Overwrite the fields set in `patch`. Returns the updated fruit, or None if absent.
    async fn update(&self, id: Uuid, patch: FruitDoc) -> Result<Option<Fruit>, AppError>;

    /// Returns the removed fruit, or None if absent.
    async fn delete(&self, id: Uuid) -> Result<Option<Fruit>, AppError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
