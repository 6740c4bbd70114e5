//! # Error Handling
//!
//! Two layers:
//!
//! - [`CatalogError`] is returned by the services. It names the domain failure
//!   (missing record, unknown reference, cyclic parent, invalid payload) and wraps
//!   database errors untouched.
//! - [`ApiError`] is the HTTP boundary. It maps each failure to a status code and a
//!   sanitized body; database details are logged with `tracing` and never sent to the
//!   client.
//!
//! ```rust,ignore
//! async fn handler(State(db): State<DatabaseConnection>) -> Result<Json<Body>, ApiError> {
//!     let body = categories::get_one(&db, id).await?; // CatalogError -> ApiError
//!     Ok(Json(body))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failure of a catalog service call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{resource} with ID '{id}' not found")]
    NotFound { resource: &'static str, id: i32 },

    /// Caller-supplied ids that do not resolve to existing rows.
    #[error("One or more {resource} were not found")]
    InvalidReference { resource: &'static str, ids: Vec<i32> },

    #[error("Category {id} cannot move under category {parent}, its own descendant or itself")]
    CyclicParent { id: i32, parent: i32 },

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl CatalogError {
    #[must_use]
    pub fn not_found(resource: &'static str, id: i32) -> Self {
        Self::NotFound { resource, id }
    }

    #[must_use]
    pub fn invalid_reference(resource: &'static str, ids: Vec<i32>) -> Self {
        Self::InvalidReference { resource, ids }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Resource doesn't exist
    NotFound {
        /// Resource type (e.g., "Category", "Product")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - Invalid input from user
    BadRequest { message: String },

    /// 401 Unauthorized - Authentication required or failed
    Unauthorized { message: String },

    /// 403 Forbidden - Caller lacks the required role
    Forbidden { message: String },

    /// 409 Conflict - Resource conflict (e.g., duplicate name)
    Conflict { message: String },

    /// 422 Unprocessable Entity - Validation failed
    ValidationFailed { errors: Vec<String> },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        message: String,
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error body sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// - `DbErr::RecordNotFound` → 404
/// - unique constraint violations → 409
/// - everything else → 500, logged and sanitized
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Self::conflict("Duplicate entry");
        }
        Self::database(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { resource, id } => {
                Self::not_found(resource, Some(id.to_string()))
            }
            CatalogError::InvalidReference { .. } | CatalogError::CyclicParent { .. } => {
                Self::bad_request(err.to_string())
            }
            CatalogError::Validation(errors) => Self::validation_failed(
                errors.into_errors().iter().map(ToString::to_string).collect(),
            ),
            CatalogError::Database(db_err) => db_err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_not_found_with_id() {
        let err = ApiError::not_found("Category", Some("12".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Category with ID '12' not found");
    }

    #[test]
    fn test_not_found_without_id() {
        let err = ApiError::not_found("Product", None);
        assert_eq!(err.user_message(), "Product not found");
    }

    #[test]
    fn test_validation_failed_multiple_errors() {
        let err = ApiError::validation_failed(vec![
            "price: Must be greater than 0".to_string(),
            "name: This field is required".to_string(),
        ]);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.user_message(),
            "Validation failed: price: Must be greater than 0, name: This field is required"
        );
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = ApiError::database(DbErr::Type("Type mismatch error".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
    }

    #[test]
    fn test_dberr_record_not_found_becomes_404() {
        let api_err: ApiError = DbErr::RecordNotFound("Brand not found".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_err.user_message(), "Brand not found");
    }

    #[test]
    fn test_other_dberr_become_500() {
        for db_err in [
            DbErr::Custom("Any custom error".to_string()),
            DbErr::Type("Type error".to_string()),
            DbErr::Json("JSON error".to_string()),
        ] {
            let api_err: ApiError = db_err.into();
            assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_invalid_reference_is_bad_request() {
        let api_err: ApiError = CatalogError::invalid_reference("categories", vec![7, 9]).into();
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api_err.user_message(), "One or more categories were not found");
    }

    #[test]
    fn test_cyclic_parent_is_bad_request() {
        let api_err: ApiError = CatalogError::CyclicParent { id: 1, parent: 3 }.into();
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
        assert!(api_err.user_message().contains("its own descendant"));
    }

    #[test]
    fn test_catalog_not_found_keeps_id() {
        let api_err: ApiError = CatalogError::not_found("Category", 42).into();
        assert_eq!(api_err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_err.user_message(), "Category with ID '42' not found");
    }

    #[test]
    fn test_catalog_validation_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new(
            "availableQuantity",
            "Must be 0 for prescription products",
        ));
        let api_err: ApiError = CatalogError::from(errors).into();
        assert_eq!(api_err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api_err.user_message(),
            "availableQuantity: Must be 0 for prescription products"
        );
    }
}
