//! Fruit resource routes.
//! `/fruits/seed` and `/fruits/new` are static segments, so the router matches them
//! before the `/fruits/:id` capture.

use crate::handlers::fruits::{create, destroy, edit, index, new, override_method, seed, show, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn fruit_routes(state: AppState) -> Router {
    Router::new()
        .route("/fruits/seed", get(seed))
        .route("/fruits", get(index).post(create))
        .route("/fruits/new", get(new))
        .route("/fruits/:id/edit", get(edit))
        .route(
            "/fruits/:id",
            get(show).put(update).delete(destroy).post(override_method),
        )
        .with_state(state)
}
