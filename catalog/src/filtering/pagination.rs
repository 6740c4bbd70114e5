use axum::http::header::HeaderMap;

/// Upper bound on rows returned by one list request
pub const MAX_PAGE_SIZE: u64 = 1000;

const DEFAULT_RANGE: (u64, u64) = (0, 24);

/// Parse an inclusive `[start, end]` range into `(offset, limit)`.
///
/// Missing or malformed input falls back to the first 25 rows; the limit is capped at
/// [`MAX_PAGE_SIZE`].
#[must_use]
pub fn parse_range(range_str: Option<&str>) -> (u64, u64) {
    let (start, end) = range_str
        .and_then(|r| serde_json::from_str::<[u64; 2]>(r).ok())
        .map_or(DEFAULT_RANGE, |[start, end]| (start, end));
    let limit = end.saturating_sub(start).saturating_add(1).min(MAX_PAGE_SIZE);
    (start, limit)
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build the `Content-Range` header, e.g. `categories 0-9/42`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let last = offset
        .saturating_add(limit)
        .min(total_count)
        .saturating_sub(1);
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{last}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_defaults() {
        assert_eq!(parse_range(None), (0, 25));
        assert_eq!(parse_range(Some("garbage")), (0, 25));
    }

    #[test]
    fn test_parse_range_inclusive() {
        assert_eq!(parse_range(Some("[10,19]")), (10, 10));
        assert_eq!(parse_range(Some("[5,5]")), (5, 1));
    }

    #[test]
    fn test_parse_range_is_capped() {
        assert_eq!(parse_range(Some("[0,999999]")), (0, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_content_range_normal() {
        let headers = calculate_content_range(0, 10, 100, "products");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert_eq!(value, "products 0-9/100");
    }

    #[test]
    fn test_content_range_short_last_page() {
        let headers = calculate_content_range(20, 25, 23, "brands");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert_eq!(value, "brands 20-22/23");
    }

    #[test]
    fn test_content_range_strips_control_characters() {
        let headers = calculate_content_range(0, 10, 100, "users\r\nInjected: evil");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
    }
}
