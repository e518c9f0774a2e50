//! Resource fetcher trait

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use vizpart_types::ResourceDescriptor;

/// A loaded, usable external resource
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub descriptor: ResourceDescriptor,
    /// Size of the fetched payload, when known
    pub bytes: Option<u64>,
    pub loaded_at: Instant,
}

impl ResourceHandle {
    pub fn new(descriptor: ResourceDescriptor, bytes: Option<u64>) -> Self {
        Self {
            descriptor,
            bytes,
            loaded_at: Instant::now(),
        }
    }
}

/// Loads one script or stylesheet.
///
/// Implementations do the actual fetch; de-duplication across instances is
/// the job of [`crate::SharedResourceManager`].
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle>;
}

pub type SharedResourceFetcher = Arc<dyn ResourceFetcher>;
