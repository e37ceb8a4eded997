//! Fruit inventory: server-rendered CRUD over fruit documents.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use model::{Fruit, FruitDoc, FruitForm, FruitInput, NewUser, User};
pub use routes::{app, common_routes, fruit_routes};
pub use service::{FruitStore, MemoryFruitStore, PgFruitStore};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, Database};
