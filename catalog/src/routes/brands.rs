//! `/brands` handlers.

use crate::brands::{Brand, BrandCreate, BrandUpdate};

super::crud::catalog_resource_handlers!(
    Brand,
    BrandCreate,
    BrandUpdate,
    "/brands",
    "/brands/{id}",
    "brand"
);
