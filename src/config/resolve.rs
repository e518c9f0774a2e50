//! Default resolution: raw properties in, fully populated configuration out.
//!
//! Every option of the schema ends up present. A value the user set is kept
//! as-is when it is already in canonical form and normalised otherwise
//! (`"14px"` becomes `14`, `"true"` becomes `true`). Anything that cannot be
//! read as the option's type, or falls outside a slider's range, is treated
//! exactly like an unset option and replaced by the documented default.

use log::{trace, warn};
use serde_json::{Map, Value};
use vizpart_core::VizError;
use vizpart_types::{ConfigSchema, OptionKind, RawConfiguration, ResolvedConfiguration};

enum Normalized {
    Value(Value),
    Unset,
    Malformed,
}

/// Resolve every schema option against the raw configuration. Never fails.
pub fn resolve(raw: &RawConfiguration, schema: &ConfigSchema) -> ResolvedConfiguration {
    let mut values = Map::new();

    for option in &schema.options {
        let resolved = match raw.get(&option.key) {
            None => option.default.clone(),
            Some(value) => match normalize(&option.kind, value) {
                Normalized::Value(v) => v,
                Normalized::Unset => option.default.clone(),
                Normalized::Malformed => {
                    let error = VizError::MalformedConfigurationValue {
                        field: option.key.clone(),
                        value: value.to_string(),
                    };
                    warn!("{}; using default {}", error, option.default);
                    option.default.clone()
                }
            },
        };
        values.insert(option.key.clone(), resolved);
    }

    trace!("Resolved {} options", values.len());
    ResolvedConfiguration::from_map(values)
}

/// Parse a font size given as `14`, `"14"` or `"14px"`.
///
/// Returns `None` for anything that is not a positive finite size.
pub fn parse_font_size(value: &Value) -> Option<f64> {
    let size = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed
                .strip_suffix("px")
                .or_else(|| trimmed.strip_suffix("PX"))
                .unwrap_or(trimmed);
            digits.trim().parse::<f64>().ok()
        }
        _ => None,
    };
    size.filter(|s| s.is_finite() && *s > 0.0)
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

fn normalize(kind: &OptionKind, value: &Value) -> Normalized {
    match kind {
        OptionKind::Boolean => match value {
            Value::Bool(_) => Normalized::Value(value.clone()),
            Value::String(s) if s.trim().is_empty() => Normalized::Unset,
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Normalized::Value(Value::Bool(true)),
                "false" => Normalized::Value(Value::Bool(false)),
                _ => Normalized::Malformed,
            },
            _ => Normalized::Malformed,
        },

        OptionKind::Number { min, max } => {
            let in_range = |n: f64| n.is_finite() && n >= *min && n <= *max;
            match value {
                Value::Number(n) if n.as_f64().is_some_and(in_range) => {
                    Normalized::Value(value.clone())
                }
                _ if is_blank(value) => Normalized::Unset,
                Value::String(s) => match s.trim().parse::<f64>() {
                    Ok(n) if in_range(n) => Normalized::Value(Value::from(n)),
                    _ => Normalized::Malformed,
                },
                _ => Normalized::Malformed,
            }
        }

        OptionKind::FontSize => {
            if is_blank(value) {
                return Normalized::Unset;
            }
            match (value, parse_font_size(value)) {
                (Value::Number(_), Some(_)) => Normalized::Value(value.clone()),
                (_, Some(size)) => Normalized::Value(Value::from(size)),
                (_, None) => Normalized::Malformed,
            }
        }

        OptionKind::Text { allow_empty } => match value {
            Value::String(s) if s.is_empty() && !allow_empty => Normalized::Unset,
            Value::String(_) => Normalized::Value(value.clone()),
            _ => Normalized::Malformed,
        },

        OptionKind::Color => match value {
            Value::String(s) if s.trim().is_empty() => Normalized::Unset,
            Value::String(_) => Normalized::Value(value.clone()),
            _ => Normalized::Malformed,
        },

        OptionKind::Choice { choices } => match value {
            Value::String(s) if s.trim().is_empty() => Normalized::Unset,
            Value::String(s) => {
                if choices.iter().any(|c| c == s) {
                    Normalized::Value(value.clone())
                } else if let Some(canonical) =
                    choices.iter().find(|c| c.eq_ignore_ascii_case(s.trim()))
                {
                    Normalized::Value(Value::String(canonical.clone()))
                } else {
                    Normalized::Malformed
                }
            }
            _ => Normalized::Malformed,
        },
    }
}
