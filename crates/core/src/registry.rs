//! Registry for visualizations

use crate::visualization::BoxedVisualization;
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Function that creates a visualization
pub type VisualizationFactory = fn() -> BoxedVisualization;

/// Registration info for a visualization
#[derive(Debug, Clone)]
pub struct VisualizationInfo {
    pub id: String,
    pub name: String,
}

/// Registry for visualizations
///
/// Built-in web parts register at startup; hosts create instances by id.
pub struct Registry {
    visualizations: BTreeMap<String, (VisualizationInfo, VisualizationFactory)>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            visualizations: BTreeMap::new(),
        }
    }

    /// Register a visualization
    pub fn register(&mut self, factory: VisualizationFactory) {
        let sample = factory();
        let info = VisualizationInfo {
            id: sample.id().to_string(),
            name: sample.name().to_string(),
        };
        self.visualizations.insert(info.id.clone(), (info, factory));
    }

    /// Create a visualization by ID
    pub fn create(&self, id: &str) -> Result<BoxedVisualization> {
        let (_, factory) = self
            .visualizations
            .get(id)
            .ok_or_else(|| anyhow!("Unknown visualization: {}", id))?;
        Ok(factory())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.visualizations.contains_key(id)
    }

    /// List all registered visualizations, sorted by id
    pub fn list(&self) -> Vec<VisualizationInfo> {
        self.visualizations
            .values()
            .map(|(info, _)| info.clone())
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instance
static GLOBAL_REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

/// Register a visualization with the global registry
pub fn register_visualization(factory: VisualizationFactory) {
    match GLOBAL_REGISTRY.write() {
        Ok(mut registry) => registry.register(factory),
        Err(e) => log::error!("Registry lock poisoned: {}", e),
    }
}

/// Create a visualization from the global registry
pub fn create_visualization(id: &str) -> Result<BoxedVisualization> {
    GLOBAL_REGISTRY
        .read()
        .map_err(|e| anyhow!("Registry lock poisoned: {}", e))?
        .create(id)
}

/// List visualizations in the global registry
pub fn list_visualizations() -> Vec<VisualizationInfo> {
    GLOBAL_REGISTRY
        .read()
        .map(|registry| registry.list())
        .unwrap_or_default()
}
