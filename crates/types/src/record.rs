//! Data records returned by a data source, plus typed views over them.
//!
//! A record is a row of named fields. Lookups are tolerant of spelling, so
//! `HoverColor`, `hoverColor`, `hover_color` and `Hover Color` all address
//! the same field. This matters because chart items come from an editor that
//! stores columns under their display labels while list rows use internal
//! names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item of a data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: Map<String, Value>,
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build from a JSON value. Non-objects yield `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Look up a field by name, falling back to a spelling-insensitive match
    pub fn field(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(name) {
            return Some(value).filter(|v| !v.is_null());
        }
        let wanted = normalize_key(name);
        self.fields
            .iter()
            .find(|(key, _)| normalize_key(key) == wanted)
            .map(|(_, value)| value)
            .filter(|v| !v.is_null())
    }

    /// First field of `names` that is present
    pub fn first_field(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| self.field(name))
    }

    /// Field rendered as text. Numbers and booleans are stringified.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field as a finite number. Numeric strings are accepted.
    pub fn number(&self, name: &str) -> Option<f64> {
        let value = match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keep only the fields named in `projection` (spelling-insensitive)
    pub fn project(&self, projection: &[String]) -> Self {
        let wanted: Vec<String> = projection.iter().map(|p| normalize_key(p)).collect();
        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| wanted.contains(&normalize_key(key)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { fields }
    }

    /// Chart view: `{label, value, color, hoverColor}`
    pub fn chart_view(&self) -> ChartRecord {
        let color = self.text("color").unwrap_or_default();
        let hover_color = self
            .text("hoverColor")
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| color.clone());
        ChartRecord {
            label: self.text("label").unwrap_or_default(),
            value: self.number("value"),
            color,
            hover_color,
        }
    }

    /// Picture view: `{title, description, file}`.
    ///
    /// Understands both the nested `File: {Name, ServerRelativeUrl}` shape of
    /// list REST responses and flat `fileUrl`/`FileRef` columns.
    pub fn picture_view(&self) -> PictureRecord {
        let file = self.field("File").and_then(Value::as_object);
        let nested = |key: &str| -> Option<String> {
            file.and_then(|f| f.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let file_url = nested("ServerRelativeUrl")
            .or_else(|| {
                self.first_field(&["fileUrl", "FileRef"])
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default();

        PictureRecord {
            title: self.text("Title"),
            description: self.text("Description"),
            file_name: nested("Name").or_else(|| self.text("FileLeafRef")),
            file_url,
        }
    }
}

/// Chart slice as read from a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    pub label: String,
    /// `None` when the record has no numeric value; the chart skips it
    pub value: Option<f64>,
    pub color: String,
    pub hover_color: String,
}

/// Picture as read from a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PictureRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Explicit file name, when the source provides one
    pub file_name: Option<String>,
    pub file_url: String,
}

impl PictureRecord {
    /// File name: the explicit one, else the last path segment of the URL
    /// without query string or fragment
    pub fn derived_file_name(&self) -> String {
        if let Some(name) = self.file_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let path = self
            .file_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_lookup_ignores_spelling() {
        let record = DataRecord::new()
            .with("Label", "A")
            .with("Hover Color", "#eee");

        assert_eq!(record.text("label").as_deref(), Some("A"));
        assert_eq!(record.text("hoverColor").as_deref(), Some("#eee"));
        assert_eq!(record.text("hover_color").as_deref(), Some("#eee"));
    }

    #[test]
    fn test_project_keeps_named_fields() {
        let record = DataRecord::new()
            .with("Title", "A")
            .with("Author", "someone")
            .with("file", json!({"Name": "a.png"}));
        let projected = record.project(&["title".to_string(), "File".to_string()]);

        assert_eq!(projected.len(), 2);
        assert!(projected.field("Author").is_none());
        assert_eq!(projected.text("Title").as_deref(), Some("A"));
    }

    #[test]
    fn test_chart_view_accepts_numeric_strings() {
        let record = DataRecord::new()
            .with("Label", "B")
            .with("Value", "12.5")
            .with("Color", "#f00");
        let view = record.chart_view();

        assert_eq!(view.value, Some(12.5));
        assert_eq!(view.hover_color, "#f00");
    }

    #[test]
    fn test_chart_view_non_numeric_value_is_none() {
        let record = DataRecord::new().with("Value", "lots");
        assert_eq!(record.chart_view().value, None);
    }

    #[test]
    fn test_picture_view_nested_file() {
        let record = DataRecord::from_json(json!({
            "Title": null,
            "Description": "Beach",
            "File": {"Name": "beach.png", "ServerRelativeUrl": "/sites/a/Pictures/beach.png"}
        }))
        .unwrap();
        let view = record.picture_view();

        assert_eq!(view.title, None);
        assert_eq!(view.description.as_deref(), Some("Beach"));
        assert_eq!(view.file_url, "/sites/a/Pictures/beach.png");
        assert_eq!(view.derived_file_name(), "beach.png");
    }

    #[test]
    fn test_derived_file_name_strips_query() {
        let view = DataRecord::new()
            .with("fileUrl", "https://host/lib/photo.jpg?width=200")
            .picture_view();
        assert_eq!(view.derived_file_name(), "photo.jpg");
    }
}
