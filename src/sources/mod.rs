//! Record sources
//!
//! Local implementations of [`RecordSource`](vizpart_core::RecordSource).
//! Both honour the query's filter, projection, ordering and result cap the
//! way a list REST endpoint would.

mod inline;
mod json_file;

pub use inline::InlineRecordSource;
pub use json_file::JsonFileRecordSource;

use serde_json::Value;
use std::cmp::Ordering;
use vizpart_types::{DataRecord, QuerySpec};

/// Apply `$filter`, `$orderby`, `$top` and `$select` to a full record set,
/// in that order
pub fn apply_query(mut records: Vec<DataRecord>, query: &QuerySpec) -> Vec<DataRecord> {
    if !query.filters.is_empty() {
        records.retain(|record| {
            query
                .filters
                .iter()
                .all(|filter| filter.matches(record.field(&filter.field)))
        });
    }

    if let Some(order) = &query.order_by {
        records.sort_by(|a, b| {
            let ordering = compare_fields(a.field(&order.field), b.field(&order.field));
            if order.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    if let Some(limit) = query.limit {
        records.truncate(limit);
    }

    if !query.select.is_empty() {
        let mut projection = query.select.clone();
        projection.extend(query.expand.iter().cloned());
        records = records.iter().map(|r| r.project(&projection)).collect();
    }

    records
}

/// Missing values sort first; numbers compare numerically, everything else
/// as text
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<DataRecord> {
        vec![
            DataRecord::new().with("Title", "b").with("Rank", 2).with("Extra", 1),
            DataRecord::new().with("Title", "C").with("Rank", 10),
            DataRecord::new().with("Title", "a").with("Rank", 1),
        ]
    }

    fn titles(records: &[DataRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.text("Title").unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_no_clauses_preserves_source_order() {
        let query = QuerySpec::parse("Pictures").unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["b", "C", "a"]);
    }

    #[test]
    fn test_order_and_top() {
        let query = QuerySpec::parse("/_api/lists/GetByTitle('X')/items?$orderby=Title&$top=2").unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["a", "b"]);

        let query =
            QuerySpec::parse("/_api/lists/GetByTitle('X')/items?$orderby=Rank desc").unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["C", "b", "a"]);
    }

    #[test]
    fn test_filter_applies_before_top() {
        let query = QuerySpec::parse(
            "/_api/lists/GetByTitle('X')/items?$filter=Rank ne 2&$orderby=Rank desc&$top=1",
        )
        .unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["C"]);

        let query =
            QuerySpec::parse("/_api/lists/GetByTitle('X')/items?$filter=Title eq 'A' and Rank eq 1")
                .unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["a"]);

        let query =
            QuerySpec::parse("/_api/lists/GetByTitle('X')/items?$filter=Extra eq null").unwrap();
        assert_eq!(titles(&apply_query(records(), &query)), vec!["C", "a"]);
    }

    #[test]
    fn test_projection() {
        let query = QuerySpec::parse("X").unwrap().with_projection(&["Title"], &[]);
        let result = apply_query(records(), &query);
        assert!(result.iter().all(|r| r.len() == 1));
    }
}
