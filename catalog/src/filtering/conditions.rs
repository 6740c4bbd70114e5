use sea_orm::{ColumnTrait, ColumnType, Condition, sea_query::SimpleExpr};
use serde_json::Value;
use std::collections::HashMap;

/// Reserved key for the name search
pub const SEARCH_KEY: &str = "q";

// Basic safety limit on filter values
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Parse the `filter` parameter. Invalid JSON yields no filters.
#[must_use]
pub fn parse_filter_json(filter_str: Option<&str>) -> HashMap<String, Value> {
    filter_str.map_or_else(HashMap::new, |filter| {
        serde_json::from_str(filter).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid JSON in filter parameter");
            HashMap::new()
        })
    })
}

/// Read an id from a filter value. Admin clients often send ids as strings.
#[must_use]
pub fn as_id(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str()?.trim().parse().ok())
}

fn is_integer_column<C: ColumnTrait>(column: C) -> bool {
    matches!(
        column.def().get_column_type(),
        ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
    )
}

fn integer_expr<C: ColumnTrait>(column: C, value: &Value) -> Option<SimpleExpr> {
    match value {
        Value::Null => Some(column.is_null()),
        Value::Array(values) => {
            let ids: Vec<i64> = values.iter().filter_map(as_id).collect();
            (!ids.is_empty()).then(|| column.is_in(ids))
        }
        other => as_id(other).map(|id| column.eq(id)),
    }
}

fn scalar_expr<C: ColumnTrait>(column: C, value: &Value) -> Option<SimpleExpr> {
    match value {
        Value::String(s) if s.len() <= MAX_FIELD_VALUE_LENGTH => Some(column.eq(s.trim())),
        Value::Number(n) => n
            .as_i64()
            .map(|i| column.eq(i))
            .or_else(|| n.as_f64().map(|f| column.eq(f))),
        Value::Bool(b) => Some(column.eq(*b)),
        Value::Null => Some(column.is_null()),
        _ => None,
    }
}

fn array_expr<C: ColumnTrait>(column: C, values: &[Value]) -> Option<SimpleExpr> {
    let strings: Vec<String> = values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    (!strings.is_empty()).then(|| column.is_in(strings))
}

/// Build an AND condition from parsed filters.
///
/// `q` becomes a substring match on `search_column`; every other key must appear in
/// `columns` and becomes an equality (or `IN` for arrays, `IS NULL` for null). Integer
/// columns accept numeric strings; a value that is not an id is ignored with a warning.
pub fn apply_filters<C: ColumnTrait + Copy>(
    filters: &HashMap<String, Value>,
    columns: &[(&str, C)],
    search_column: Option<C>,
) -> Condition {
    let mut condition = Condition::all();

    if let (Some(column), Some(Value::String(q))) = (search_column, filters.get(SEARCH_KEY)) {
        let q = q.trim();
        if !q.is_empty() && q.len() <= MAX_FIELD_VALUE_LENGTH {
            condition = condition.add(column.contains(q));
        }
    }

    for (key, value) in filters {
        if key == SEARCH_KEY {
            continue;
        }
        let Some(&(_, column)) = columns.iter().find(|(name, _)| name == key) else {
            continue;
        };
        let expr = if is_integer_column(column) {
            integer_expr(column, value)
        } else {
            match value {
                Value::Array(values) => array_expr(column, values),
                other => scalar_expr(column, other),
            }
        };
        match expr {
            Some(expr) => condition = condition.add(expr),
            None => tracing::warn!(key = %key, "Ignoring filter value of the wrong type"),
        }
    }

    condition
}
