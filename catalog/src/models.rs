use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for filtering, pagination, and sorting list endpoints.
///
/// # Filtering
/// `filter` is a JSON object:
/// - **Name search:** `{"q": "ibupro"}`
/// - **One or many ids:** `{"id": 3}` or `{"id": [3, 4]}`
/// - **Other columns:** `{"brandId": 2, "isPrescriptionRequired": false}`
/// - **Category browsing** (products only): `{"categoryId": 1}` also returns products
///   of every subcategory, because products carry their ancestor tags.
///
/// # Pagination
/// `range` is an inclusive JSON pair, for example `[0,24]`.
///
/// # Sorting
/// `sort` is a JSON pair of column and direction, for example `["name","ASC"]`.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct FilterOptions {
    /// JSON-encoded filter, e.g. `{"q": "search text", "categoryId": 1}`
    #[param(example = r#"{"q": "ibuprofen"}"#)]
    pub filter: Option<String>,
    /// Inclusive range for pagination in the format "[start, end]".
    #[param(example = "[0,24]")]
    pub range: Option<String>,
    /// Sort order in the format `["column", "order"]`.
    #[param(example = r#"["name", "ASC"]"#)]
    pub sort: Option<String>,
}
