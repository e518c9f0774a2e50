//! External resources (scripts and stylesheets) a renderer depends on

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Script,
    Stylesheet,
}

/// One external resource to load before rendering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub url: String,
    /// Global symbol the script exposes once evaluated (e.g. `Chart`)
    #[serde(default)]
    pub global_symbol: Option<String>,
    pub kind: ResourceKind,
}

impl ResourceDescriptor {
    pub fn script(url: impl Into<String>, global_symbol: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            global_symbol: Some(global_symbol.into()),
            kind: ResourceKind::Script,
        }
    }

    pub fn stylesheet(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            global_symbol: None,
            kind: ResourceKind::Stylesheet,
        }
    }

    /// Identity used by the process-wide load-once registry
    pub fn key(&self) -> &str {
        &self.url
    }

    /// Last path segment of the URL
    pub fn file_name(&self) -> &str {
        self.url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}
