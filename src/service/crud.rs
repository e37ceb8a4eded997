//! Fruit documents in PostgreSQL: one row per fruit, body in a JSONB `doc` column.

use super::FruitStore;
use crate::error::AppError;
use crate::model::{Fruit, FruitDoc};
use crate::store::ensure_tables;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

#[derive(FromRow)]
struct FruitRow {
    id: Uuid,
    doc: Json<FruitDoc>,
}

impl From<FruitRow> for Fruit {
    fn from(row: FruitRow) -> Self {
        Fruit::from_doc(row.id, row.doc.0)
    }
}

const SELECT_ALL: &str = "SELECT id, doc FROM fruits ORDER BY created_at, id";
const SELECT_ONE: &str = "SELECT id, doc FROM fruits WHERE id = $1";
const INSERT: &str = "INSERT INTO fruits (id, doc) VALUES ($1, $2) RETURNING id, doc";
const MERGE: &str = "UPDATE fruits SET doc = doc || $2 WHERE id = $1 RETURNING id, doc";
const DELETE_ONE: &str = "DELETE FROM fruits WHERE id = $1 RETURNING id, doc";
const DELETE_ALL: &str = "DELETE FROM fruits";

#[derive(Clone)]
pub struct PgFruitStore {
    pool: PgPool,
    /// Set once the tables are known to exist; a failed attempt leaves it unset.
    schema: Arc<OnceCell<()>>,
}

impl PgFruitStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Create the tables if this store has not done so yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        self.schema
            .get_or_try_init(|| ensure_tables(&self.pool))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FruitStore for PgFruitStore {
    async fn seed(&self, docs: Vec<FruitDoc>) -> Result<Vec<Fruit>, AppError> {
        self.ensure_schema().await?;
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %DELETE_ALL, "query (tx)");
        let removed = sqlx::query(DELETE_ALL).execute(&mut *tx).await?.rows_affected();

        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            tracing::debug!(sql = %INSERT, "query (tx)");
            let row: FruitRow = sqlx::query_as(INSERT)
                .bind(Uuid::new_v4())
                .bind(Json(doc))
                .fetch_one(&mut *tx)
                .await?;
            out.push(row.into());
        }
        tx.commit().await?;
        tracing::info!(removed, inserted = out.len(), "fruits seeded");
        Ok(out)
    }

    async fn list(&self) -> Result<Vec<Fruit>, AppError> {
        self.ensure_schema().await?;
        tracing::debug!(sql = %SELECT_ALL, "query");
        let rows: Vec<FruitRow> = sqlx::query_as(SELECT_ALL).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Fruit::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Fruit>, AppError> {
        self.ensure_schema().await?;
        tracing::debug!(sql = %SELECT_ONE, %id, "query");
        let row: Option<FruitRow> = sqlx::query_as(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Fruit::from))
    }

    async fn create(&self, doc: FruitDoc) -> Result<Fruit, AppError> {
        self.ensure_schema().await?;
        tracing::debug!(sql = %INSERT, "query");
        let row: FruitRow = sqlx::query_as(INSERT)
            .bind(Uuid::new_v4())
            .bind(Json(doc))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, patch: FruitDoc) -> Result<Option<Fruit>, AppError> {
        self.ensure_schema().await?;
        tracing::debug!(sql = %MERGE, %id, "query");
        let row: Option<FruitRow> = sqlx::query_as(MERGE)
            .bind(id)
            .bind(Json(patch))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Fruit::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Fruit>, AppError> {
        self.ensure_schema().await?;
        tracing::debug!(sql = %DELETE_ONE, %id, "query");
        let row: Option<FruitRow> = sqlx::query_as(DELETE_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Fruit::from))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.ensure_schema().await?;
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
