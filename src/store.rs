//! Connection manager and table DDL.
//!
//! [`Database`] is built once at startup and handed to the router; there is no
//! process-wide connection. Lifecycle events (opened, closed, error) are only logged.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::service::{FruitStore, MemoryFruitStore, PgFruitStore};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::sync::Arc;

/// Fruit documents. `clock_timestamp()` keeps rows inserted in one transaction ordered.
pub const FRUITS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS fruits (
    id UUID PRIMARY KEY,
    doc JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
)
"#;

pub const USERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Create the `fruits` and `users` tables if they do not exist.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in [FRUITS_DDL, USERS_DDL] {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database named in `database_url` exists; create it if not. Connects to the
/// `postgres` database on the same server to run CREATE DATABASE. URLs without a
/// database name, or naming `postgres` itself, need no bootstrap.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = bootstrap_target(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Admin connect options and target database name, when the URL names a database to bootstrap.
fn bootstrap_target(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, AppError> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let db_name = opts
        .get_database()
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(str::to_string);
    Ok(db_name.map(|name| (opts.database("postgres"), name)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The single store handle shared by every request.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn FruitStore>,
    pool: Option<PgPool>,
}

impl Database {
    /// Open the configured store.
    ///
    /// Database bootstrap, pool connection and table creation fail independently:
    /// each failure is logged and startup continues. A pool that could not connect
    /// is replaced by a lazily-connecting one, and tables missing at startup are
    /// created by the store on first use.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        if config.uses_memory_store() {
            tracing::info!("using in-memory fruit store");
            return Ok(Self::memory());
        }

        if let Err(e) = ensure_database_exists(&config.database_url).await {
            tracing::warn!(error = %e, "database bootstrap skipped");
        }

        let options = PgPoolOptions::new().max_connections(config.max_connections);
        let (pool, connected) = match options.clone().connect(&config.database_url).await {
            Ok(pool) => {
                tracing::info!(max_connections = config.max_connections, "connected to postgres");
                (pool, true)
            }
            Err(e) => {
                tracing::error!(error = %e, "postgres connection error");
                (options.connect_lazy(&config.database_url)?, false)
            }
        };

        let store = PgFruitStore::new(pool.clone());
        if connected {
            if let Err(e) = store.ensure_schema().await {
                tracing::error!(error = %e, "creating tables failed; retrying on first use");
            }
        }
        Ok(Self {
            store: Arc::new(store),
            pool: Some(pool),
        })
    }

    pub fn memory() -> Self {
        Self {
            store: Arc::new(MemoryFruitStore::new()),
            pool: None,
        }
    }

    pub fn fruits(&self) -> Arc<dyn FruitStore> {
        Arc::clone(&self.store)
    }

    /// Close the pool (if any) and log the closed event.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("disconnected from postgres");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_reads_database_name_past_query_slashes() {
        let (admin, name) = bootstrap_target(
            "postgres://u:p@db.example.com:5432/fruits?sslmode=verify-full&sslrootcert=/etc/ssl/ca.pem",
        )
        .unwrap()
        .expect("database name should be found");
        assert_eq!(name, "fruits");
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db.example.com");
        assert_eq!(admin.get_port(), 5432);
    }

    #[test]
    fn bootstrap_skips_url_without_database() {
        match bootstrap_target("postgres://u:p@localhost:5432").unwrap() {
            None => {}
            // libpq defaults apply when the URL has no path.
            Some((_, name)) => {
                assert_ne!(name, "u:p@localhost:5432");
                assert_eq!(Some(name), std::env::var("PGDATABASE").ok());
            }
        }
    }

    #[test]
    fn bootstrap_skips_postgres_database() {
        assert!(bootstrap_target("postgres://localhost/postgres").unwrap().is_none());
    }

    #[test]
    fn bootstrap_rejects_garbage_url() {
        assert!(matches!(bootstrap_target("not a url"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("fruits"), "\"fruits\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[tokio::test]
    async fn memory_database_shares_one_store() {
        let db = Database::memory();
        let created = db.fruits().create(Default::default()).await.unwrap();
        assert!(db.fruits().get(created.id).await.unwrap().is_some());
        db.close().await;
    }
}
