//! Query specifications for remote list sources.
//!
//! The query option holds a list REST URL fragment produced by the list
//! picker, e.g. `/_api/lists/GetByTitle('Pictures')/items?$orderby=Title asc&$top=20&`.
//! [`QuerySpec`] extracts the target collection, filter, ordering and result
//! cap from it and renders it back into a request URL with the projection
//! appended.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Projection requested for picture libraries. Includes every column
/// [`DataRecord::picture_view`](crate::DataRecord::picture_view) reads.
pub const PICTURE_PROJECTION: &[&str] = &[
    "Title",
    "Description",
    "id",
    "File",
    "FileSystemObjectType",
    "FileRef",
    "FileLeafRef",
    "fileUrl",
];

/// Lookups expanded for picture libraries
pub const PICTURE_EXPAND: &[&str] = &["File"];

static BY_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)getbytitle\('((?:[^']|'')*)'\)").expect("valid regex"));
static BY_GUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)lists\(guid'([0-9a-f-]+)'\)").expect("valid regex"));
static ORDER_BY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$orderby=([^&]+)").expect("valid regex"));
static TOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\$top=(\d+)").expect("valid regex"));
static FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$filter=([^&]+)").expect("valid regex"));
// One `Field eq|ne value` comparison, optionally followed by `and`
static COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([A-Za-z_]\w*)\s+(eq|ne)\s+('(?:[^']|'')*'|[^\s']+)\s*(?:\band\b|$)")
        .expect("valid regex")
});

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
}

/// One `$filter` comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    /// String, number, boolean or null literal
    pub value: Value,
}

impl FieldFilter {
    /// Whether a record field value satisfies this clause. Text compares
    /// case-insensitively; a null literal matches a missing field.
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let equal = match (&self.value, actual) {
            (Value::Null, None) => true,
            (Value::Null, Some(_)) | (_, None) => false,
            (Value::Number(want), Some(Value::Number(have))) => want.as_f64() == have.as_f64(),
            (Value::Number(want), Some(Value::String(have))) => {
                have.trim().parse::<f64>().ok() == want.as_f64()
            }
            (Value::Bool(want), Some(Value::Bool(have))) => want == have,
            (Value::String(want), Some(Value::String(have))) => want.to_lowercase() == have.to_lowercase(),
            (want, Some(have)) => literal_text(want) == literal_text(have),
        };
        match self.op {
            FilterOp::Eq => equal,
            FilterOp::Ne => !equal,
        }
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}

fn parse_literal(token: &str) -> Value {
    if let Some(quoted) = token.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Value::String(quoted.replace("''", "'"));
    }
    match token.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => serde_json::from_str::<serde_json::Number>(token)
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(token.to_string())),
    }
}

fn decode_clause(clause: &str) -> String {
    clause
        .replace("%20", " ")
        .replace("%27", "'")
        .replace('+', " ")
}

/// Parse `Field eq 'x' and Other ne 3`. Parsing stops at the first clause
/// that is not a plain comparison; the clauses before it still apply.
fn parse_filters(expression: &str) -> Vec<FieldFilter> {
    let mut filters = Vec::new();
    let mut rest = expression.trim();
    while !rest.is_empty() {
        let Some(caps) = COMPARISON.captures(rest) else {
            log::warn!("Unsupported $filter clause '{}', ignoring it", rest);
            break;
        };
        let op = if caps[2].eq_ignore_ascii_case("ne") {
            FilterOp::Ne
        } else {
            FilterOp::Eq
        };
        filters.push(FieldFilter {
            field: caps[1].to_string(),
            op,
            value: parse_literal(&caps[3]),
        });
        rest = rest[caps.get(0).map_or(rest.len(), |m| m.end())..].trim_start();
    }
    filters
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// What to fetch from a remote data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// The query text exactly as configured
    pub raw: String,
    /// Target collection (list title or id)
    pub collection: String,
    /// `$filter` comparisons, all of which must hold
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    /// Field projection
    #[serde(default)]
    pub select: Vec<String>,
    /// Lookup fields to expand
    #[serde(default)]
    pub expand: Vec<String>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    /// Result-count cap
    #[serde(default)]
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Parse a configured query. Blank input yields `None`.
    ///
    /// Parsing is lenient: when no list selector is recognised the whole
    /// query text is used as the collection identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let collection = BY_TITLE
            .captures(trimmed)
            .map(|c| c[1].replace("''", "'"))
            .or_else(|| BY_GUID.captures(trimmed).map(|c| c[1].to_lowercase()))
            .unwrap_or_else(|| {
                log::debug!("No list selector in query '{}', using it as the collection", trimmed);
                trimmed.to_string()
            });

        let order_by = ORDER_BY.captures(trimmed).and_then(|c| {
            let clause = decode_clause(&c[1]);
            let mut parts = clause.split_whitespace();
            let field = parts.next()?.to_string();
            let descending = parts
                .next()
                .is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));
            Some(OrderBy { field, descending })
        });

        let filters = FILTER
            .captures(trimmed)
            .map(|c| parse_filters(&decode_clause(&c[1])))
            .unwrap_or_default();

        let limit = TOP
            .captures(trimmed)
            .and_then(|c| c[1].parse::<usize>().ok());

        Some(Self {
            raw: trimmed.to_string(),
            collection,
            filters,
            select: Vec::new(),
            expand: Vec::new(),
            order_by,
            limit,
        })
    }

    /// Set the field projection and expanded lookups
    pub fn with_projection(mut self, select: &[&str], expand: &[&str]) -> Self {
        self.select = select.iter().map(|s| s.to_string()).collect();
        self.expand = expand.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Cap the result count. A configured `$top` above the cap is lowered.
    pub fn capped(mut self, max: usize) -> Self {
        self.limit = Some(self.limit.map_or(max, |top| top.min(max)));
        self
    }

    /// Request URL: the configured query with expand/select appended
    pub fn request_url(&self) -> String {
        let mut url = self.raw.clone();
        if !(url.ends_with('?') || url.ends_with('&')) {
            url.push(if url.contains('?') { '&' } else { '?' });
        }

        let mut params = Vec::new();
        if !self.expand.is_empty() {
            params.push(format!("$expand={}", self.expand.join(",")));
        }
        if !self.select.is_empty() {
            params.push(format!("$select={}", self.select.join(",")));
        }
        url.push_str(&params.join("&"));
        url.trim_end_matches(['?', '&']).to_string()
    }

    /// Identity of the data this query selects, used to tell a data source
    /// change apart from a styling change
    pub fn cache_key(&self) -> String {
        format!("{}|{:?}", self.request_url(), self.limit)
    }
}
