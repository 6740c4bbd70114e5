//! Translation of list query parameters into Sea-ORM conditions, ordering and paging.
//!
//! ```text
//! GET /products?filter={"q":"ibu","categoryId":2}&range=[0,9]&sort=["name","ASC"]
//! ```
//!
//! Filter keys are matched against a per-resource whitelist of `(api name, column)`
//! pairs; unknown keys are ignored.

pub mod conditions;
pub mod pagination;
pub mod sort;

pub use conditions::{apply_filters, as_id, parse_filter_json};
pub use pagination::{MAX_PAGE_SIZE, calculate_content_range, parse_range};
pub use sort::generic_sort;
