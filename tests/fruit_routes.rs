use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use fruit_inventory::{app, AppError, AppState, Fruit, FruitDoc, FruitStore, MemoryFruitStore};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const FORM: &str = "application/x-www-form-urlencoded";

fn memory_app() -> Router {
    app(AppState::new(Arc::new(MemoryFruitStore::new())))
}

async fn send(app: &Router, method: &str, uri: &str, form: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if form.is_some() {
        builder = builder.header(header::CONTENT_TYPE, FORM);
    }
    let body = form.map(|f| Body::from(f.to_string())).unwrap_or_else(Body::empty);
    app.clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed")
}

async fn body_string(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

async fn seed(app: &Router) -> Vec<Fruit> {
    let resp = send(app, "GET", "/fruits/seed", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    serde_json::from_str(&body_string(resp).await).expect("seed did not return fruits")
}

fn assert_redirects_to_index(resp: &Response) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/fruits");
}

#[tokio::test]
async fn seed_always_yields_the_five_fixed_fruits() {
    let app = memory_app();
    let resp = send(&app, "POST", "/fruits", Some("name=Kiwi&color=green")).await;
    assert_redirects_to_index(&resp);

    for _ in 0..2 {
        let fruits = seed(&app).await;
        let pairs: Vec<_> = fruits
            .iter()
            .map(|f| (f.name.as_deref().unwrap(), f.color.as_deref().unwrap(), f.ready_to_eat))
            .collect();
        assert_eq!(
            pairs,
            [
                ("Orange", "orange", Some(false)),
                ("Grape", "purple", Some(false)),
                ("Banana", "orange", Some(false)),
                ("Strawberry", "red", Some(false)),
                ("Coconut", "brown", Some(false)),
            ]
        );
    }

    let html = body_string(send(&app, "GET", "/fruits", None).await).await;
    assert!(!html.contains("Kiwi"));
    assert_eq!(html.matches("<li>").count(), 5);
}

#[tokio::test]
async fn seed_json_uses_camel_case_fields() {
    let app = memory_app();
    let resp = send(&app, "GET", "/fruits/seed", None).await;
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert_eq!(first["name"], "Orange");
    assert_eq!(first["readyToEat"], false);
    assert!(first["id"].is_string());
}

#[tokio::test]
async fn literal_routes_are_not_captured_by_id() {
    let app = memory_app();
    let resp = send(&app, "GET", "/fruits/new", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("<h1>New Fruit</h1>"));
    assert!(html.contains("action=\"/fruits\" method=\"POST\""));

    assert_eq!(seed(&app).await.len(), 5);
}

#[tokio::test]
async fn checkbox_absent_creates_unripe_fruit() {
    let store = Arc::new(MemoryFruitStore::new());
    let app = app(AppState::new(store.clone()));
    let resp = send(&app, "POST", "/fruits", Some("name=Kiwi&color=green")).await;
    assert_redirects_to_index(&resp);

    let fruits = store.list().await.unwrap();
    assert_eq!(fruits.len(), 1);
    assert_eq!(fruits[0].name.as_deref(), Some("Kiwi"));
    assert_eq!(fruits[0].color.as_deref(), Some("green"));
    assert_eq!(fruits[0].ready_to_eat, Some(false));
}

#[tokio::test]
async fn checkbox_on_creates_ripe_fruit() {
    let store = Arc::new(MemoryFruitStore::new());
    let app = app(AppState::new(store.clone()));
    send(&app, "POST", "/fruits", Some("name=Kiwi&readyToEat=on")).await;
    send(&app, "POST", "/fruits", Some("name=Fig&readyToEat=yes")).await;

    let fruits = store.list().await.unwrap();
    assert_eq!(fruits[0].ready_to_eat, Some(true));
    assert_eq!(fruits[0].color, None);
    assert_eq!(fruits[1].ready_to_eat, Some(false));
}

#[tokio::test]
async fn edit_and_show_render_the_same_record() {
    let app = memory_app();
    for fruit in seed(&app).await {
        let edit = body_string(send(&app, "GET", &format!("/fruits/{}/edit", fruit.id), None).await).await;
        let show = body_string(send(&app, "GET", &format!("/fruits/{}", fruit.id), None).await).await;
        let name = fruit.name.unwrap();
        let color = fruit.color.unwrap();
        assert!(edit.contains(&format!("value=\"{}\"", name)));
        assert!(edit.contains(&format!("value=\"{}\"", color)));
        assert!(show.contains(&format!("The {} is {}", name, color)));
    }
}

#[tokio::test]
async fn update_round_trips_through_show() {
    let store = Arc::new(MemoryFruitStore::new());
    let app = app(AppState::new(store.clone()));
    let grape = seed(&app).await.remove(1);

    let uri = format!("/fruits/{}", grape.id);
    let resp = send(&app, "PUT", &uri, Some("color=green&readyToEat=on")).await;
    assert_redirects_to_index(&resp);

    let html = body_string(send(&app, "GET", &uri, None).await).await;
    assert!(html.contains("The Grape is green"));
    assert!(html.contains("It is ready to eat"));

    let stored = store.get(grape.id).await.unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("Grape"));
    assert_eq!(stored.ready_to_eat, Some(true));

    // Unchecked box on a later edit flips it back.
    send(&app, "PUT", &uri, Some("name=Grape&color=green")).await;
    assert_eq!(store.get(grape.id).await.unwrap().unwrap().ready_to_eat, Some(false));
}

#[tokio::test]
async fn delete_then_show_is_not_found() {
    let app = memory_app();
    let banana = seed(&app).await.remove(2);
    let uri = format!("/fruits/{}", banana.id);

    let resp = send(&app, "DELETE", &uri, None).await;
    assert_redirects_to_index(&resp);

    let resp = send(&app, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["error"]["code"], "not_found");

    let resp = send(&app, "GET", &format!("{}/edit", uri), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_of_missing_id_still_redirect() {
    let app = memory_app();
    let uri = format!("/fruits/{}", Uuid::new_v4());
    assert_redirects_to_index(&send(&app, "PUT", &uri, Some("name=Ghost")).await);
    assert_redirects_to_index(&send(&app, "DELETE", &uri, None).await);
}

#[tokio::test]
async fn method_override_dispatches_put_and_delete() {
    let store = Arc::new(MemoryFruitStore::new());
    let app = app(AppState::new(store.clone()));
    let coconut = seed(&app).await.remove(4);

    let resp = send(
        &app,
        "POST",
        &format!("/fruits/{}?_method=PUT", coconut.id),
        Some("name=Coco&color=brown&readyToEat=on"),
    )
    .await;
    assert_redirects_to_index(&resp);
    let stored = store.get(coconut.id).await.unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("Coco"));

    let resp = send(&app, "POST", &format!("/fruits/{}?_method=delete", coconut.id), Some("")).await;
    assert_redirects_to_index(&resp);
    assert!(store.get(coconut.id).await.unwrap().is_none());
    assert_eq!(store.list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn delete_override_needs_no_form_body() {
    let store = Arc::new(MemoryFruitStore::new());
    let app = app(AppState::new(store.clone()));
    let grape = seed(&app).await.remove(1);

    let resp = send(&app, "POST", &format!("/fruits/{}?_method=DELETE", grape.id), None).await;
    assert_redirects_to_index(&resp);
    assert!(store.get(grape.id).await.unwrap().is_none());
}

#[tokio::test]
async fn put_override_without_form_is_unsupported_media_type() {
    let app = memory_app();
    let grape = seed(&app).await.remove(1);

    let resp = send(&app, "POST", &format!("/fruits/{}?_method=PUT", grape.id), None).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn unsupported_override_is_rejected() {
    let app = memory_app();
    let resp = send(&app, "POST", &format!("/fruits/{}?_method=PATCH", Uuid::new_v4()), Some("")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["error"]["code"], "method_not_allowed");
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let app = memory_app();
    let resp = send(&app, "GET", "/fruits/not-a-uuid", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn index_escapes_user_text() {
    let app = memory_app();
    send(&app, "POST", "/fruits", Some("name=%3Cscript%3Ealert(1)%3C%2Fscript%3E")).await;
    let html = body_string(send(&app, "GET", "/fruits", None).await).await;
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn oversized_form_is_rejected() {
    let app = memory_app();
    let name = "a".repeat(fruit_inventory::routes::BODY_LIMIT_BYTES + 1);
    let resp = send(&app, "POST", "/fruits", Some(&format!("name={}", name))).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn status_routes_respond() {
    let app = memory_app();
    assert_eq!(body_string(send(&app, "GET", "/", None).await).await, "server is running");

    let resp = send(&app, "GET", "/ready", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["database"], "ok");

    let json: serde_json::Value =
        serde_json::from_str(&body_string(send(&app, "GET", "/version", None).await).await).unwrap();
    assert_eq!(json["name"], "fruit-inventory");

    assert_eq!(send(&app, "GET", "/info", None).await.status(), StatusCode::NOT_FOUND);
}

/// Store whose every call fails, standing in for a dropped database connection.
struct UnavailableStore;

fn unavailable() -> AppError {
    AppError::Db(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl FruitStore for UnavailableStore {
    async fn seed(&self, _docs: Vec<FruitDoc>) -> Result<Vec<Fruit>, AppError> {
        Err(unavailable())
    }
    async fn list(&self) -> Result<Vec<Fruit>, AppError> {
        Err(unavailable())
    }
    async fn get(&self, _id: Uuid) -> Result<Option<Fruit>, AppError> {
        Err(unavailable())
    }
    async fn create(&self, _doc: FruitDoc) -> Result<Fruit, AppError> {
        Err(unavailable())
    }
    async fn update(&self, _id: Uuid, _patch: FruitDoc) -> Result<Option<Fruit>, AppError> {
        Err(unavailable())
    }
    async fn delete(&self, _id: Uuid) -> Result<Option<Fruit>, AppError> {
        Err(unavailable())
    }
    async fn ping(&self) -> Result<(), AppError> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn store_failures_become_typed_json_errors() {
    let app = app(AppState::new(Arc::new(UnavailableStore)));
    let id = Uuid::new_v4();
    let cases = [
        ("GET", "/fruits/seed".to_string(), None),
        ("GET", "/fruits".to_string(), None),
        ("GET", format!("/fruits/{}", id), None),
        ("GET", format!("/fruits/{}/edit", id), None),
        ("POST", "/fruits".to_string(), Some("name=Kiwi")),
        ("PUT", format!("/fruits/{}", id), Some("name=Kiwi")),
        ("DELETE", format!("/fruits/{}", id), None),
    ];
    for (method, uri, form) in cases {
        let resp = send(&app, method, &uri, form).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["error"]["code"], "database_error");
    }

    // The form page needs no store.
    assert_eq!(send(&app, "GET", "/fruits/new", None).await.status(), StatusCode::OK);

    let resp = send(&app, "GET", "/ready", None).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
