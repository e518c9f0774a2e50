//! Configuration store trait

use serde_json::Value;
use vizpart_types::RawConfiguration;

/// Owner of a web part's properties.
///
/// Writes come from the change notifier; the orchestrator takes a snapshot
/// at the point it needs the configuration.
pub trait ConfigurationStore: Send + Sync {
    /// Get a field, `None` when unset
    fn get(&self, field: &str) -> Option<Value>;

    /// Write a field
    fn set(&self, field: &str, value: Value);

    /// Consistent copy of every field
    fn snapshot(&self) -> RawConfiguration;
}
