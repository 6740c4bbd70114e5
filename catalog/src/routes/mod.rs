//! HTTP surface. Reads are public; every mutating route sits behind
//! [`require_admin`](crate::auth::require_admin).

pub mod brands;
pub mod categories;
pub mod crud;
pub mod ingredients;
pub mod products;

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::require_admin;
use crate::openapi::ApiDoc;
use crate::state::AppState;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route("/brands", get(brands::get_all_handler))
        .route("/brands/{id}", get(brands::get_one_handler))
        .route("/ingredients", get(ingredients::get_all_handler))
        .route("/ingredients/{id}", get(ingredients::get_one_handler))
        .route("/openapi.json", get(openapi_json))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/products", post(products::create_product))
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/brands", post(brands::create_one_handler))
        .route(
            "/brands/{id}",
            put(brands::update_one_handler).delete(brands::delete_one_handler),
        )
        .route("/ingredients", post(ingredients::create_one_handler))
        .route(
            "/ingredients/{id}",
            put(ingredients::update_one_handler).delete(ingredients::delete_one_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

/// The complete application router, docs included.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(admin_routes(&state))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
}
