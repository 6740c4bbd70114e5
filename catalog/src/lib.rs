//! # Pharmacy Catalog
//!
//! REST API for a pharmacy catalog: products, brands, ingredients and a category
//! hierarchy.
//!
//! Products are tagged with the *ancestor closure* of the categories an administrator
//! picks for them (see [`hierarchy`]), so browsing `/products?filter={"categoryId":1}`
//! returns everything filed anywhere under category 1.
//!
//! ```rust,ignore
//! let db = Database::connect("sqlite::memory:").await?;
//! Migrator::up(&db, None).await?;
//! let verifier = StaticTokenVerifier::new().with_token("secret", Role::Administrator);
//! let app = pharmacy_catalog::router(AppState::new(db, verifier));
//! ```

pub mod auth;
pub mod brands;
pub mod categories;
pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod hierarchy;
pub mod ingredients;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod products;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{CredentialVerifier, Role, StaticTokenVerifier};
pub use config::Config;
pub use crate::core::CatalogResource;
pub use errors::{ApiError, CatalogError};
pub use hierarchy::{CategoryTree, expand_categories};
pub use migration::Migrator;
pub use routes::router;
pub use state::AppState;
