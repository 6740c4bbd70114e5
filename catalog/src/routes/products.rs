//! `/products` handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::filtering::{calculate_content_range, parse_filter_json, parse_range};
use crate::models::FilterOptions;
use crate::products::{self, Product, ProductCreate, ProductUpdate};

/// List products. `{"categoryId": n}` in `filter` also finds products of every
/// subcategory of `n`.
#[utoipa::path(
    get,
    path = "/products",
    params(FilterOptions),
    responses(
        (status = 200, description = "One page of products", body = [Product]),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list_products(
    Query(params): Query<FilterOptions>,
    State(db): State<DatabaseConnection>,
) -> Result<(HeaderMap, Json<Vec<Product>>), ApiError> {
    let filters = parse_filter_json(params.filter.as_deref());
    let (offset, limit) = parse_range(params.range.as_deref());
    let (items, total_count) =
        products::list(&db, &filters, params.sort.as_deref(), offset, limit).await?;
    let headers = calculate_content_range(offset, limit, total_count, "products");
    Ok((headers, Json(items)))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with category closure", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(products::get_one(&db, id).await?))
}

/// Create a product. `categoryIds` in the response is the ancestor closure of the
/// requested categories.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductCreate,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Unknown brand, ingredient or category"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_product(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let created = products::create(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Unknown brand, ingredient or category"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_product(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(products::update(&db, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    products::delete(&db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
