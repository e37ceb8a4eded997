//! Document shapes for the two collections and the typed inputs that build them.

pub mod fruit;
pub mod user;

pub use fruit::{seed_docs, Fruit, FruitDoc, FruitForm, FruitInput, SEED_FRUITS};
pub use user::{NewUser, User};
