//! HTTP handlers for the fruits resource.

pub mod fruits;
