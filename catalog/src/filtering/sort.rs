use sea_orm::{ColumnTrait, sea_query::Order};

const DEFAULT_SORT_ORDER: &str = "ASC";

/// Parse `["column", "ASC"|"DESC"]`. Returns `None` when the input is not such a pair.
fn parse_json_sort(json: &str) -> Option<(String, String)> {
    let sort_vec: Vec<String> = serde_json::from_str(json).ok()?;
    let column = sort_vec.first()?.clone();
    let order = sort_vec
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string());
    Some((column, order))
}

fn parse_order(sort_order: &str) -> Order {
    if sort_order.eq_ignore_ascii_case("DESC") {
        Order::Desc
    } else {
        Order::Asc
    }
}

/// Resolve the `sort` parameter against a whitelist of `(api name, column)` pairs.
/// Unknown columns fall back to `default_column`.
pub fn generic_sort<C>(sort: Option<&str>, columns: &[(&str, C)], default_column: C) -> (C, Order)
where
    C: ColumnTrait + Copy,
{
    let Some((name, order)) = sort.and_then(parse_json_sort) else {
        return (default_column, Order::Asc);
    };
    let column = columns
        .iter()
        .find(|&&(col_name, _)| col_name == name)
        .map_or(default_column, |&(_, col)| col);
    (column, parse_order(&order))
}
