//! Shared resource manager - loads each external resource at most once
//!
//! Scripts and stylesheets are page-global: once a library has been loaded
//! for one web part instance, every other instance can use it. This module
//! keeps one entry per resource URL for the lifetime of the process. The
//! first requester performs the load; concurrent requesters await the same
//! in-flight load; later requesters get the completed handle immediately.
//!
//! A failed load leaves the entry unloaded, so the next request retries.

use crate::resource::{ResourceFetcher, ResourceHandle};
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::OnceCell;
use vizpart_types::ResourceDescriptor;

/// One page-global resource and its load state
pub struct SharedResource {
    pub descriptor: ResourceDescriptor,
    /// Set exactly once, when a load succeeds
    loaded: OnceCell<ResourceHandle>,
    /// Number of underlying fetches started
    attempts: AtomicUsize,
    /// Instances that asked for this resource
    requesters: Mutex<HashSet<String>>,
}

impl SharedResource {
    fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            loaded: OnceCell::new(),
            attempts: AtomicUsize::new(0),
            requesters: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requester_count(&self) -> usize {
        self.requesters.lock().map(|r| r.len()).unwrap_or(0)
    }
}

/// Manages page-global resource loads, keyed by resource URL
pub struct SharedResourceManager {
    resources: RwLock<HashMap<String, Arc<SharedResource>>>,
}

impl SharedResourceManager {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// Get the entry for a descriptor, creating it on first request
    fn entry(&self, descriptor: &ResourceDescriptor) -> Result<Arc<SharedResource>> {
        // Phase 1: quick read lock for the common case
        {
            let resources = self
                .resources
                .read()
                .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
            if let Some(existing) = resources.get(descriptor.key()) {
                return Ok(Arc::clone(existing));
            }
        }

        // Phase 2: insert under write lock, re-checking in case another
        // caller created it in between
        let mut resources = self
            .resources
            .write()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let entry = resources
            .entry(descriptor.key().to_string())
            .or_insert_with(|| {
                debug!("Registered shared resource {}", descriptor.key());
                Arc::new(SharedResource::new(descriptor.clone()))
            });
        Ok(Arc::clone(entry))
    }

    /// Load a resource, sharing one underlying load per URL.
    ///
    /// No lock is held while the fetch is in flight; waiters park on the
    /// entry's once-cell instead.
    pub async fn load(
        &self,
        descriptor: &ResourceDescriptor,
        requester: &str,
        fetcher: &dyn ResourceFetcher,
    ) -> Result<ResourceHandle> {
        let shared = self.entry(descriptor)?;

        if let Ok(mut requesters) = shared.requesters.lock() {
            requesters.insert(requester.to_string());
        }

        if let Some(handle) = shared.loaded.get() {
            debug!(
                "Resource {} already loaded, reusing for {}",
                descriptor.key(),
                requester
            );
            return Ok(handle.clone());
        }

        let handle = shared
            .loaded
            .get_or_try_init(|| async {
                let attempt = shared.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                info!(
                    "Loading {:?} {} for {} (attempt {})",
                    descriptor.kind,
                    descriptor.key(),
                    requester,
                    attempt
                );
                fetcher.load(descriptor).await.map_err(|e| {
                    warn!("Load of {} failed: {}", descriptor.key(), e);
                    e
                })
            })
            .await?;

        Ok(handle.clone())
    }

    /// Whether a resource has completed loading
    pub fn is_loaded(&self, url: &str) -> bool {
        self.get(url).is_some_and(|r| r.is_loaded())
    }

    /// Number of underlying fetches started for a resource
    pub fn attempts(&self, url: &str) -> usize {
        self.get(url).map(|r| r.attempts()).unwrap_or(0)
    }

    pub fn get(&self, url: &str) -> Option<Arc<SharedResource>> {
        let resources = self.resources.read().ok()?;
        resources.get(url).cloned()
    }

    /// URLs of every resource that has completed loading
    pub fn loaded_urls(&self) -> Vec<String> {
        self.resources
            .read()
            .map(|resources| {
                resources
                    .iter()
                    .filter(|(_, r)| r.is_loaded())
                    .map(|(url, _)| url.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Debug: print all resources and their load state
    pub fn debug_print_resources(&self) {
        if let Ok(resources) = self.resources.read() {
            info!("=== Shared Resources ({} total) ===", resources.len());
            for (url, shared) in resources.iter() {
                info!(
                    "  {} : loaded={}, attempts={}, requesters={}",
                    url,
                    shared.is_loaded(),
                    shared.attempts(),
                    shared.requester_count()
                );
            }
        }
    }
}

impl Default for SharedResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

// Global shared resource manager, lives for the whole process
static GLOBAL_SHARED_RESOURCE_MANAGER: Lazy<Arc<SharedResourceManager>> =
    Lazy::new(|| Arc::new(SharedResourceManager::new()));

/// Get the process-wide resource manager. Created on first use.
pub fn global_resource_manager() -> Arc<SharedResourceManager> {
    Arc::clone(&GLOBAL_SHARED_RESOURCE_MANAGER)
}
