//! Visualization trait and related types

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use vizpart_types::{
    ConfigSchema, DataRecord, QuerySpec, RawConfiguration, RenderOptions, ResolvedConfiguration,
    ResourceDescriptor, SeriesData,
};

/// Where a visualization's records come from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSelection {
    /// Records stored in the configuration itself
    Inline(Vec<DataRecord>),
    /// Records fetched from a remote source
    Remote(QuerySpec),
}

impl DataSelection {
    /// Identity of the selected data. Equal keys mean the data source did not
    /// change between two render requests.
    pub fn cache_key(&self) -> String {
        match self {
            DataSelection::Inline(records) => {
                let mut hasher = DefaultHasher::new();
                serde_json::to_string(records)
                    .unwrap_or_default()
                    .hash(&mut hasher);
                format!("inline:{}:{:016x}", records.len(), hasher.finish())
            }
            DataSelection::Remote(query) => format!("remote:{}", query.cache_key()),
        }
    }

    /// Short description for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            DataSelection::Inline(records) => format!("{} inline records", records.len()),
            DataSelection::Remote(query) => query.collection.clone(),
        }
    }
}

/// Trait for all visualizations
///
/// A visualization translates a property set into the options of one
/// third-party renderer. It owns the option schema (with defaults), knows
/// which source option selects its data, which external resources its
/// renderer needs, and how records map to series.
pub trait Visualization: Send + Sync {
    /// Unique identifier for this visualization type
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Recognised styling options and their defaults
    fn config_schema(&self) -> ConfigSchema;

    /// Option that selects the data source
    fn source_field(&self) -> &str;

    /// Text shown while the source selection is missing
    fn placeholder_message(&self) -> String;

    /// Data selected by the configuration, `None` when unconfigured
    fn data_selection(&self, raw: &RawConfiguration, max_records: usize) -> Option<DataSelection>;

    /// External resources, in load order. Later entries may require earlier ones.
    fn dependencies(&self, cdn_base: &str) -> Vec<ResourceDescriptor>;

    /// Map records to series, one entry per record, order preserved
    fn map_records(&self, records: &[DataRecord]) -> SeriesData;

    /// Build renderer options from resolved configuration and series
    fn build_options(&self, resolved: &ResolvedConfiguration, series: &SeriesData)
        -> RenderOptions;
}

/// Type-erased visualization for dynamic dispatch
pub type BoxedVisualization = Box<dyn Visualization>;

pub type SharedVisualization = Arc<dyn Visualization>;
