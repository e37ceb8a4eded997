//! Router assembly.

mod common;
mod fruits;

pub use common::common_routes;
pub use fruits::fruit_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Upper bound on form bodies.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// The full application: common and fruit routes behind request tracing and a body limit.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(fruit_routes(state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
}
