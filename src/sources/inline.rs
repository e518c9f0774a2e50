//! In-memory record source

use super::apply_query;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use vizpart_core::{RecordSource, SourceMetadata};
use vizpart_types::{DataRecord, QuerySpec};

/// Serves records held in memory.
///
/// Named collections are matched case-insensitively; records given to
/// [`InlineRecordSource::new`] answer any other collection.
pub struct InlineRecordSource {
    metadata: SourceMetadata,
    fallback: Option<Vec<DataRecord>>,
    collections: HashMap<String, Vec<DataRecord>>,
    fetches: AtomicUsize,
}

impl InlineRecordSource {
    pub fn new(records: Vec<DataRecord>) -> Self {
        Self {
            fallback: Some(records),
            ..Self::empty()
        }
    }

    /// A source with no records at all; every fetch fails until a
    /// collection is added
    pub fn empty() -> Self {
        Self {
            metadata: SourceMetadata {
                id: "inline".to_string(),
                name: "Inline records".to_string(),
                description: "Records held in memory".to_string(),
            },
            fallback: None,
            collections: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_collection(mut self, name: &str, records: Vec<DataRecord>) -> Self {
        self.collections.insert(name.to_lowercase(), records);
        self
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for InlineRecordSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<DataRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let records = self
            .collections
            .get(&query.collection.to_lowercase())
            .or(self.fallback.as_ref())
            .ok_or_else(|| anyhow!("Unknown collection '{}'", query.collection))?;

        debug!(
            "Inline source: {} records in '{}'",
            records.len(),
            query.collection
        );
        Ok(apply_query(records.clone(), query))
    }
}
