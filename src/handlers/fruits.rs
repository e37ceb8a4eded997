//! Fruit resource handlers: seed, index, new, edit, create, update, destroy, show.

use crate::error::AppError;
use crate::model::{seed_docs, Fruit, FruitDoc, FruitForm};
use crate::state::AppState;
use crate::views::{self, Page};
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

const INDEX_PATH: &str = "/fruits";

fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest(format!("invalid fruit id '{}'", id_str)))
}

async fn find(state: &AppState, id_str: &str) -> Result<Fruit, AppError> {
    let id = parse_id(id_str)?;
    state
        .fruits
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("fruit {}", id)))
}

/// GET /fruits/seed
pub async fn seed(State(state): State<AppState>) -> Result<Json<Vec<Fruit>>, AppError> {
    let fruits = state.fruits.seed(seed_docs()).await?;
    Ok(Json(fruits))
}

/// GET /fruits
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let fruits = state.fruits.list().await?;
    Ok(Html(views::render(Page::Index(&fruits))))
}

/// GET /fruits/new
pub async fn new() -> Html<String> {
    Html(views::render(Page::New))
}

/// GET /fruits/:id/edit
pub async fn edit(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<Html<String>, AppError> {
    let fruit = find(&state, &id_str).await?;
    Ok(Html(views::render(Page::Edit(&fruit))))
}

/// GET /fruits/:id
pub async fn show(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<Html<String>, AppError> {
    let fruit = find(&state, &id_str).await?;
    Ok(Html(views::render(Page::Show(&fruit))))
}

/// POST /fruits
pub async fn create(State(state): State<AppState>, Form(form): Form<FruitForm>) -> Result<Redirect, AppError> {
    let doc: FruitDoc = form.into_input().into();
    let fruit = state.fruits.create(doc).await?;
    tracing::info!(id = %fruit.id, "fruit created");
    Ok(Redirect::to(INDEX_PATH))
}

/// PUT /fruits/:id. A missing id still redirects.
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Form(form): Form<FruitForm>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id_str)?;
    let patch: FruitDoc = form.into_input().into();
    match state.fruits.update(id, patch).await? {
        Some(_) => tracing::info!(%id, "fruit updated"),
        None => tracing::debug!(%id, "update matched no fruit"),
    }
    Ok(Redirect::to(INDEX_PATH))
}

/// DELETE /fruits/:id. A missing id still redirects.
pub async fn destroy(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<Redirect, AppError> {
    let id = parse_id(&id_str)?;
    match state.fruits.delete(id).await? {
        Some(_) => tracing::info!(%id, "fruit deleted"),
        None => tracing::debug!(%id, "delete matched no fruit"),
    }
    Ok(Redirect::to(INDEX_PATH))
}

#[derive(Debug, Default, Deserialize)]
pub struct MethodOverride {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

/// POST /fruits/:id?_method=PUT|DELETE, for HTML forms that can only POST.
/// Only the PUT arm reads the body, so a DELETE needs no form content type.
pub async fn override_method(
    state: State<AppState>,
    path: Path<String>,
    Query(query): Query<MethodOverride>,
    form: Result<Form<FruitForm>, FormRejection>,
) -> Result<Response, AppError> {
    let method = query.method.unwrap_or_default().to_ascii_uppercase();
    match method.as_str() {
        "PUT" => match form {
            Ok(form) => Ok(update(state, path, form).await?.into_response()),
            Err(rejection) => Ok(rejection.into_response()),
        },
        "DELETE" => Ok(destroy(state, path).await?.into_response()),
        "" => Err(AppError::MethodNotAllowed("POST /fruits/:id requires _method".into())),
        other => Err(AppError::MethodNotAllowed(format!("_method={} is not supported", other))),
    }
}
