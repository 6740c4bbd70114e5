//! `/categories` handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use sea_orm::DatabaseConnection;

use crate::categories::{self, Category, CategoryCreate, CategoryUpdate};
use crate::errors::ApiError;
use crate::filtering::calculate_content_range;

/// Every category with its direct children.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories ordered by id", body = [Category]),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list_categories(
    State(db): State<DatabaseConnection>,
) -> Result<(HeaderMap, Json<Vec<Category>>), ApiError> {
    let items = categories::list(&db).await?;
    let total = items.len() as u64;
    let headers = calculate_content_range(0, total, total, "categories");
    Ok((headers, Json(items)))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category and its direct children", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(categories::get_one(&db, id).await?))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Parent category does not exist"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_category(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let created = categories::create(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename or move a category. Moving it under itself or a descendant is rejected.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Unknown parent, or the move would create a cycle"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_category(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(categories::update(&db, id, payload).await?))
}

/// Delete a category. Its products lose the tag and its children become roots.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Missing or unknown bearer token"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    categories::delete(&db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
