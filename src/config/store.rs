//! Property store: the owning configuration store of a web part instance.
//!
//! Readers take lock-free snapshots; writers replace the whole bag, so a
//! snapshot never observes a half-applied edit.

use anyhow::{anyhow, Result};
use arc_swap::ArcSwap;
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vizpart_core::ConfigurationStore;
use vizpart_types::RawConfiguration;

pub struct PropertyStore {
    values: ArcSwap<RawConfiguration>,
    /// File the properties were loaded from, if any
    path: Option<PathBuf>,
}

impl PropertyStore {
    pub fn new(values: RawConfiguration) -> Self {
        Self {
            values: ArcSwap::from_pointee(values),
            path: None,
        }
    }

    /// Load properties from a JSON object document
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&content)?;
        let values = RawConfiguration::from_json(json)
            .ok_or_else(|| anyhow!("{:?} does not contain a JSON object", path))?;
        info!("Loaded {} properties from {:?}", values.len(), path);

        Ok(Self {
            values: ArcSwap::from_pointee(values),
            path: Some(path.to_path_buf()),
        })
    }

    /// Save back to the file the store was loaded from
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("Property store has no backing file"))?;
        self.save_to_path(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let values = self.values.load_full();
        let content = serde_json::to_string_pretty(&*values)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new(RawConfiguration::new())
    }
}

impl ConfigurationStore for PropertyStore {
    fn get(&self, field: &str) -> Option<Value> {
        self.values.load().get(field).cloned()
    }

    fn set(&self, field: &str, value: Value) {
        debug!("Property {} = {}", field, value);
        self.values.rcu(|current| {
            let mut next = RawConfiguration::clone(current);
            next.set(field, value.clone());
            Arc::new(next)
        });
    }

    fn snapshot(&self) -> RawConfiguration {
        RawConfiguration::clone(&self.values.load())
    }
}
