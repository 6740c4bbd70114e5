use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use pharmacy_catalog::{AppState, Migrator, Role, StaticTokenVerifier, router};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const CUSTOMER_TOKEN: &str = "customer-token";

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let verifier = StaticTokenVerifier::new()
        .with_token(ADMIN_TOKEN, Role::Administrator)
        .with_token(CUSTOMER_TOKEN, Role::Customer);
    router(AppState::new(db, verifier))
}

/// Response status, `Content-Range` header and parsed JSON body (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub content_range: Option<String>,
    pub body: Value,
}

#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_range = response
        .headers()
        .get("Content-Range")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    TestResponse {
        status,
        content_range,
        body,
    }
}

#[allow(dead_code)]
pub async fn admin(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    send(app, method, uri, Some(ADMIN_TOKEN), body).await
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, "GET", uri, None, None).await
}

/// Create a category and return its id.
#[allow(dead_code)]
pub async fn create_category(app: &Router, name: &str, parent: Option<i64>) -> i64 {
    let response = admin(
        app,
        "POST",
        "/categories",
        Some(serde_json::json!({ "name": name, "parentCategoryId": parent })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_i64().unwrap()
}

/// `categoryIds` of a product response as plain integers.
#[allow(dead_code)]
pub fn category_ids(product: &Value) -> Vec<i64> {
    product["categoryIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

/// Percent-encode a JSON query value for use in a request URI.
#[allow(dead_code)]
pub fn encode_query(value: &str) -> String {
    url_escape::encode_component(value).to_string()
}
