//! In-process fruit store for local runs (`DATABASE_URL=memory`) and tests.

use super::FruitStore;
use crate::error::AppError;
use crate::model::{Fruit, FruitDoc};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Fruits kept in insertion order.
#[derive(Default)]
pub struct MemoryFruitStore {
    docs: RwLock<Vec<(Uuid, FruitDoc)>>,
}

impl MemoryFruitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FruitStore for MemoryFruitStore {
    async fn seed(&self, docs: Vec<FruitDoc>) -> Result<Vec<Fruit>, AppError> {
        let mut guard = self.docs.write().await;
        let removed = guard.len();
        guard.clear();
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = Uuid::new_v4();
            guard.push((id, doc.clone()));
            out.push(Fruit::from_doc(id, doc));
        }
        tracing::info!(removed, inserted = out.len(), "fruits seeded");
        Ok(out)
    }

    async fn list(&self) -> Result<Vec<Fruit>, AppError> {
        let guard = self.docs.read().await;
        Ok(guard
            .iter()
            .map(|(id, doc)| Fruit::from_doc(*id, doc.clone()))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Fruit>, AppError> {
        let guard = self.docs.read().await;
        Ok(guard
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(k, doc)| Fruit::from_doc(*k, doc.clone())))
    }

    async fn create(&self, doc: FruitDoc) -> Result<Fruit, AppError> {
        let id = Uuid::new_v4();
        self.docs.write().await.push((id, doc.clone()));
        Ok(Fruit::from_doc(id, doc))
    }

    async fn update(&self, id: Uuid, patch: FruitDoc) -> Result<Option<Fruit>, AppError> {
        let mut guard = self.docs.write().await;
        Ok(guard.iter_mut().find(|(k, _)| *k == id).map(|(k, doc)| {
            doc.merge(patch);
            Fruit::from_doc(*k, doc.clone())
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Fruit>, AppError> {
        let mut guard = self.docs.write().await;
        let pos = guard.iter().position(|(k, _)| *k == id);
        Ok(pos.map(|i| {
            let (k, doc) = guard.remove(i);
            Fruit::from_doc(k, doc)
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
