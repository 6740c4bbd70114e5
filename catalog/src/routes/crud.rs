use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use sea_orm::DatabaseConnection;

use crate::core::CatalogResource;
use crate::errors::ApiError;
use crate::filtering::{
    apply_filters, calculate_content_range, generic_sort, parse_filter_json, parse_range,
};
use crate::models::FilterOptions;

/// List a resource with `filter`, `range` and `sort`, answering with `Content-Range`.
///
/// # Errors
///
/// Database errors, logged and sanitized by [`ApiError`].
pub async fn get_all<T>(
    Query(params): Query<FilterOptions>,
    State(db): State<DatabaseConnection>,
) -> Result<(HeaderMap, Json<Vec<T>>), ApiError>
where
    T: CatalogResource,
{
    let filters = parse_filter_json(params.filter.as_deref());
    let condition = apply_filters(&filters, &T::filterable_columns(), T::search_column());
    let (order_column, order_direction) =
        generic_sort(params.sort.as_deref(), &T::sortable_columns(), T::ID_COLUMN);
    let (offset, limit) = parse_range(params.range.as_deref());

    let items = T::get_all(&db, &condition, order_column, order_direction, offset, limit).await?;
    let total_count = T::total_count(&db, &condition).await?;
    let headers = calculate_content_range(offset, limit, total_count, T::RESOURCE_NAME_PLURAL);
    Ok((headers, Json(items)))
}

/// # Errors
///
/// 404 when the id does not exist.
pub async fn get_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<T>, ApiError>
where
    T: CatalogResource,
{
    Ok(Json(T::get_one(&db, id).await?))
}

/// # Errors
///
/// 422 for an invalid payload, 409 for a duplicate name.
pub async fn create_one<T>(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<T::CreateModel>,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: CatalogResource,
{
    let created = T::create(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// # Errors
///
/// 404 when the id does not exist, 422 for an invalid payload, 409 for a duplicate name.
pub async fn update_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<T::UpdateModel>,
) -> Result<Json<T>, ApiError>
where
    T: CatalogResource,
{
    Ok(Json(T::update(&db, id, payload).await?))
}

/// # Errors
///
/// 404 when the id does not exist.
pub async fn delete_one<T>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError>
where
    T: CatalogResource,
{
    T::delete(&db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Documented handlers for one [`CatalogResource`], delegating to the generic ones above.
///
/// Expands to `get_all_handler`, `get_one_handler`, `create_one_handler`,
/// `update_one_handler` and `delete_one_handler` in the calling module.
macro_rules! catalog_resource_handlers {
    ($resource:ty, $create:ty, $update:ty, $path:tt, $id_path:tt, $name:tt) => {
        #[utoipa::path(
            get,
            path = $path,
            params(crate::models::FilterOptions),
            responses(
                (status = 200, description = "One page of resources", body = [$resource]),
                (status = 500, description = "Internal Server Error")
            ),
            operation_id = concat!("get_all_", $name)
        )]
        pub async fn get_all_handler(
            query: axum::extract::Query<crate::models::FilterOptions>,
            state: axum::extract::State<sea_orm::DatabaseConnection>,
        ) -> Result<
            (axum::http::HeaderMap, axum::Json<Vec<$resource>>),
            crate::errors::ApiError,
        > {
            crate::routes::crud::get_all::<$resource>(query, state).await
        }

        #[utoipa::path(
            get,
            path = $id_path,
            params(("id" = i32, Path, description = "Resource id")),
            responses(
                (status = 200, description = "The requested resource", body = $resource),
                (status = 404, description = "Resource not found")
            ),
            operation_id = concat!("get_one_", $name)
        )]
        pub async fn get_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: axum::extract::Path<i32>,
        ) -> Result<axum::Json<$resource>, crate::errors::ApiError> {
            crate::routes::crud::get_one::<$resource>(state, path).await
        }

        #[utoipa::path(
            post,
            path = $path,
            request_body = $create,
            responses(
                (status = 201, description = "Resource created successfully", body = $resource),
                (status = 401, description = "Missing or unknown bearer token"),
                (status = 403, description = "Administrator role required"),
                (status = 409, description = "Duplicate record"),
                (status = 422, description = "Validation failed")
            ),
            operation_id = concat!("create_one_", $name)
        )]
        pub async fn create_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            json: axum::Json<$create>,
        ) -> Result<(axum::http::StatusCode, axum::Json<$resource>), crate::errors::ApiError> {
            crate::routes::crud::create_one::<$resource>(state, json).await
        }

        #[utoipa::path(
            put,
            path = $id_path,
            params(("id" = i32, Path, description = "Resource id")),
            request_body = $update,
            responses(
                (status = 200, description = "Resource updated successfully", body = $resource),
                (status = 401, description = "Missing or unknown bearer token"),
                (status = 403, description = "Administrator role required"),
                (status = 404, description = "Resource not found"),
                (status = 409, description = "Duplicate record"),
                (status = 422, description = "Validation failed")
            ),
            operation_id = concat!("update_one_", $name)
        )]
        pub async fn update_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: axum::extract::Path<i32>,
            json: axum::Json<$update>,
        ) -> Result<axum::Json<$resource>, crate::errors::ApiError> {
            crate::routes::crud::update_one::<$resource>(state, path, json).await
        }

        #[utoipa::path(
            delete,
            path = $id_path,
            params(("id" = i32, Path, description = "Resource id")),
            responses(
                (status = 204, description = "Resource deleted successfully"),
                (status = 401, description = "Missing or unknown bearer token"),
                (status = 403, description = "Administrator role required"),
                (status = 404, description = "Resource not found")
            ),
            operation_id = concat!("delete_one_", $name)
        )]
        pub async fn delete_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: axum::extract::Path<i32>,
        ) -> Result<axum::http::StatusCode, crate::errors::ApiError> {
            crate::routes::crud::delete_one::<$resource>(state, path).await
        }
    };
}

pub(crate) use catalog_resource_handlers;
