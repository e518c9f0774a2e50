//! Option schemas: the recognised options of a visualization and their
//! documented defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an option's value is validated and normalised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    /// Toggle
    Boolean,
    /// Slider value, inclusive range
    Number { min: f64, max: f64 },
    /// Font size in device-independent pixels; accepts `14`, `"14"` or `"14px"`
    FontSize,
    /// Free text. When `allow_empty` is false an empty string counts as unset.
    Text { allow_empty: bool },
    /// CSS color string
    Color,
    /// One of a fixed set of keys
    Choice { choices: Vec<String> },
}

/// A recognised option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Property key
    pub key: String,
    /// Human-readable name
    pub name: String,
    pub kind: OptionKind,
    /// Value used when the option is unset or malformed
    pub default: Value,
}

impl OptionSpec {
    pub fn boolean(key: &str, name: &str, default: bool) -> Self {
        Self::new(key, name, OptionKind::Boolean, Value::Bool(default))
    }

    pub fn number(key: &str, name: &str, min: f64, max: f64, default: f64) -> Self {
        Self::new(key, name, OptionKind::Number { min, max }, Value::from(default))
    }

    pub fn font_size(key: &str, name: &str, default: f64) -> Self {
        Self::new(key, name, OptionKind::FontSize, Value::from(default))
    }

    pub fn text(key: &str, name: &str, default: &str, allow_empty: bool) -> Self {
        Self::new(
            key,
            name,
            OptionKind::Text { allow_empty },
            Value::from(default),
        )
    }

    pub fn color(key: &str, name: &str, default: &str) -> Self {
        Self::new(key, name, OptionKind::Color, Value::from(default))
    }

    pub fn choice(key: &str, name: &str, choices: &[&str], default: &str) -> Self {
        Self::new(
            key,
            name,
            OptionKind::Choice {
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
            Value::from(default),
        )
    }

    fn new(key: &str, name: &str, kind: OptionKind, default: Value) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            kind,
            default,
        }
    }
}

/// The full option table of a visualization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub options: Vec<OptionSpec>,
}

impl ConfigSchema {
    pub fn new(options: Vec<OptionSpec>) -> Self {
        Self { options }
    }

    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
