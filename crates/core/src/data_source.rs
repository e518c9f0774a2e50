//! Record source trait and related types

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use vizpart_types::{DataRecord, QuerySpec};

/// Metadata about a record source
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Unique identifier for this source type
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of where records come from
    pub description: String,
}

/// Trait for remote data sources
///
/// A source returns an ordered sequence of records for a query. Order is
/// significant (slice order, slide order) and must be preserved.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Get metadata about this source
    fn metadata(&self) -> &SourceMetadata;

    /// Fetch records matching the query
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<DataRecord>>;

    /// Check if this source can currently be queried
    fn is_available(&self) -> bool {
        true
    }
}

/// Shared record source for dynamic dispatch
pub type SharedRecordSource = Arc<dyn RecordSource>;
