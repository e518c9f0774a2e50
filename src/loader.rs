//! Per-instance dependency loading
//!
//! A [`DependencyLoader`] owns the ordered dependency list of one web part
//! instance. Dependencies load strictly one after another, because a plugin
//! script needs its host library to be present first. Each individual load
//! goes through the page-global [`SharedResourceManager`], so a library shared
//! by several instances is fetched once.
//!
//! The whole sequence runs at most once per instance: concurrent callers wait
//! for the sequence already in flight, and once it has completed every call
//! returns immediately. A failed sequence is not remembered, so a later call
//! starts again (resources that did load are reused from the manager).

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use vizpart_core::{SharedResourceFetcher, SharedResourceManager, VizError};
use vizpart_types::ResourceDescriptor;

/// Which dependencies have completed loading.
///
/// Flags start false and are set true once, never reset.
#[derive(Debug)]
pub struct LoadState {
    flags: Vec<AtomicBool>,
}

impl LoadState {
    fn new(count: usize) -> Self {
        Self {
            flags: (0..count).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    fn mark_loaded(&self, index: usize) {
        if let Some(flag) = self.flags.get(index) {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    pub fn loaded_count(&self) -> usize {
        self.flags
            .iter()
            .filter(|flag| flag.load(Ordering::SeqCst))
            .count()
    }
}

pub struct DependencyLoader {
    /// Instance identity, for the manager's bookkeeping and for logs
    requester: String,
    dependencies: Vec<ResourceDescriptor>,
    state: LoadState,
    completed: OnceCell<()>,
    manager: Arc<SharedResourceManager>,
    fetcher: SharedResourceFetcher,
}

impl DependencyLoader {
    pub fn new(
        requester: impl Into<String>,
        dependencies: Vec<ResourceDescriptor>,
        manager: Arc<SharedResourceManager>,
        fetcher: SharedResourceFetcher,
    ) -> Self {
        let state = LoadState::new(dependencies.len());
        Self {
            requester: requester.into(),
            dependencies,
            state,
            completed: OnceCell::new(),
            manager,
            fetcher,
        }
    }

    /// Whether every dependency has loaded
    pub fn is_loaded(&self) -> bool {
        self.completed.initialized()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn dependencies(&self) -> &[ResourceDescriptor] {
        &self.dependencies
    }

    /// Load every dependency in order. Completes once all have loaded.
    pub async fn ensure_loaded(&self) -> Result<(), VizError> {
        if self.completed.initialized() {
            return Ok(());
        }

        self.completed
            .get_or_try_init(|| self.load_in_order())
            .await
            .map(|_| ())
    }

    async fn load_in_order(&self) -> Result<(), VizError> {
        for (index, descriptor) in self.dependencies.iter().enumerate() {
            // Each await completes before the next dependency starts
            self.manager
                .load(descriptor, &self.requester, self.fetcher.as_ref())
                .await
                .map_err(|e| {
                    warn!(
                        "{}: dependency {} failed after {} of {} loaded",
                        self.requester,
                        descriptor.key(),
                        self.state.loaded_count(),
                        self.dependencies.len()
                    );
                    VizError::DependencyLoadFailed {
                        url: descriptor.url.clone(),
                        reason: e.to_string(),
                    }
                })?;
            self.state.mark_loaded(index);
            debug!("{}: loaded {}", self.requester, descriptor.key());
        }

        info!(
            "{}: all {} dependencies ready",
            self.requester,
            self.dependencies.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use vizpart_core::{ResourceFetcher, ResourceHandle};

    /// Records start/finish events so ordering can be asserted
    #[derive(Default)]
    struct RecordingFetcher {
        events: Mutex<Vec<String>>,
        failing: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResourceFetcher for RecordingFetcher {
        async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle> {
            let name = descriptor.file_name().to_string();
            self.events.lock().unwrap().push(format!("start {name}"));
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.failing.lock().unwrap().contains(&name) {
                return Err(anyhow!("404"));
            }
            self.events.lock().unwrap().push(format!("done {name}"));
            Ok(ResourceHandle::new(descriptor.clone(), None))
        }
    }

    fn deps() -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor::script("//cdn/jquery.min.js", "jQuery"),
            ResourceDescriptor::script("//cdn/unitegallery.min.js", "jQuery"),
            ResourceDescriptor::script("//cdn/ug-theme-carousel.js", "jQuery"),
        ]
    }

    fn loader(fetcher: Arc<RecordingFetcher>, manager: Arc<SharedResourceManager>) -> DependencyLoader {
        DependencyLoader::new("instance", deps(), manager, fetcher)
    }

    #[tokio::test]
    async fn test_dependencies_load_strictly_in_order() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let loader = loader(fetcher.clone(), Arc::new(SharedResourceManager::new()));

        loader.ensure_loaded().await.unwrap();

        let events = fetcher.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start jquery.min.js",
                "done jquery.min.js",
                "start unitegallery.min.js",
                "done unitegallery.min.js",
                "start ug-theme-carousel.js",
                "done ug-theme-carousel.js",
            ]
        );
        assert!(loader.is_loaded());
        assert_eq!(loader.state().loaded_count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_calls_load_each_resource_once() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let manager = Arc::new(SharedResourceManager::new());
        let loader = loader(fetcher.clone(), manager.clone());

        let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
        assert!(a.is_ok() && b.is_ok());

        for desc in deps() {
            assert_eq!(manager.attempts(desc.key()), 1);
        }
        let starts = fetcher
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("start"))
            .count();
        assert_eq!(starts, 3);
    }

    #[tokio::test]
    async fn test_second_instance_reuses_page_global_loads() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let manager = Arc::new(SharedResourceManager::new());
        let first = loader(fetcher.clone(), manager.clone());
        let second = DependencyLoader::new("other", deps(), manager.clone(), fetcher.clone());

        first.ensure_loaded().await.unwrap();
        second.ensure_loaded().await.unwrap();

        assert_eq!(fetcher.events.lock().unwrap().len(), 6);
        assert!(second.is_loaded());
    }

    #[tokio::test]
    async fn test_failure_stops_chain_and_allows_retry() {
        let fetcher = Arc::new(RecordingFetcher::default());
        fetcher
            .failing
            .lock()
            .unwrap()
            .push("unitegallery.min.js".to_string());
        let loader = loader(fetcher.clone(), Arc::new(SharedResourceManager::new()));

        let err = loader.ensure_loaded().await.unwrap_err();
        assert!(err.is_dependency_error());
        assert!(!loader.is_loaded());
        assert!(loader.state().is_loaded(0));
        assert!(!loader.state().is_loaded(1));
        assert!(!loader.state().is_loaded(2));
        assert!(!fetcher
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.contains("ug-theme-carousel")));

        fetcher.failing.lock().unwrap().clear();
        loader.ensure_loaded().await.unwrap();
        assert!(loader.is_loaded());
        // jQuery came from the manager; it was not fetched again
        let jquery_starts = fetcher
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == "start jquery.min.js")
            .count();
        assert_eq!(jquery_starts, 1);
    }
}
