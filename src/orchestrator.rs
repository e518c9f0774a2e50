//! Render orchestrator - the per-instance render state machine
//!
//! ```text
//! Unconfigured ──selection set──▶ AwaitingData ──records──▶ AwaitingDependencies
//!                                                             │ loaded
//!                      Rendered ◀──construct── Ready ◀────────┘
//! ```
//!
//! Every render request takes its turn behind a fair lock, so requests are
//! processed in arrival order and never interleave. While a fetch or a load
//! is in flight the previous output stays on the page. A request only goes
//! back to the network when the data selection changed; a styling-only edit
//! re-resolves the configuration and reconstructs the renderer directly.

use crate::config::{resolve, AppSettings};
use crate::loader::DependencyLoader;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use vizpart_core::{
    ConfigurationStore, DataSelection, MountPoint, RenderHandle, RenderOptions,
    SharedRecordSource, SharedRenderer, SharedResourceFetcher, SharedResourceManager,
    SharedVisualization, VizError,
};
use vizpart_types::SeriesData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Source selection missing; only a placeholder is shown
    Unconfigured,
    /// Records are being fetched
    AwaitingData,
    /// External resources are being loaded
    AwaitingDependencies,
    /// Everything is in place, the renderer is about to be constructed
    Ready,
    /// The renderer has been constructed
    Rendered,
}

/// Result of one render request. Never a hard failure.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Configuration incomplete; show this text instead of a visualization
    Placeholder { message: String },
    /// The renderer was constructed with these options
    Rendered {
        options: RenderOptions,
        handle: RenderHandle,
    },
    /// Dependencies are not available; the pre-render placeholder stays
    NotReady { error: VizError },
    /// Fetch or construction failed; the previous output stays and the error
    /// goes to a message region
    Stale { error: VizError },
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { .. })
    }

    pub fn options(&self) -> Option<&RenderOptions> {
        match self {
            RenderOutcome::Rendered { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&VizError> {
        match self {
            RenderOutcome::NotReady { error } | RenderOutcome::Stale { error } => Some(error),
            _ => None,
        }
    }
}

/// Series mapped from the last successful fetch
struct CachedSeries {
    key: String,
    series: SeriesData,
}

/// Collaborators an orchestrator is built from
pub struct OrchestratorParts {
    pub mount: MountPoint,
    pub visualization: SharedVisualization,
    pub store: Arc<dyn ConfigurationStore>,
    pub source: SharedRecordSource,
    pub fetcher: SharedResourceFetcher,
    pub resources: Arc<SharedResourceManager>,
    pub renderer: SharedRenderer,
    pub settings: AppSettings,
}

pub struct RenderOrchestrator {
    mount: MountPoint,
    visualization: SharedVisualization,
    store: Arc<dyn ConfigurationStore>,
    source: SharedRecordSource,
    renderer: SharedRenderer,
    loader: Arc<DependencyLoader>,
    settings: AppSettings,
    state: Mutex<RenderState>,
    cached: Mutex<Option<CachedSeries>>,
    /// Fair lock: waiters are served in arrival order
    turn: tokio::sync::Mutex<()>,
    fetches: AtomicU64,
    constructed: AtomicBool,
}

impl RenderOrchestrator {
    pub fn new(parts: OrchestratorParts) -> Self {
        let dependencies = parts.visualization.dependencies(parts.settings.cdn_base());
        let loader = DependencyLoader::new(
            format!("{}#{}", parts.visualization.id(), parts.mount),
            dependencies,
            parts.resources,
            parts.fetcher,
        );

        Self {
            mount: parts.mount,
            visualization: parts.visualization,
            store: parts.store,
            source: parts.source,
            renderer: parts.renderer,
            loader: Arc::new(loader),
            settings: parts.settings,
            state: Mutex::new(RenderState::Unconfigured),
            cached: Mutex::new(None),
            turn: tokio::sync::Mutex::new(()),
            fetches: AtomicU64::new(0),
            constructed: AtomicBool::new(false),
        }
    }

    pub fn mount(&self) -> &MountPoint {
        &self.mount
    }

    pub fn visualization(&self) -> &SharedVisualization {
        &self.visualization
    }

    pub fn state(&self) -> RenderState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(RenderState::Unconfigured)
    }

    /// Number of data fetches performed (remote and inline)
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Whether a visualization has ever been constructed on the mount
    pub fn has_rendered(&self) -> bool {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn dependencies_loaded(&self) -> bool {
        self.loader.is_loaded()
    }

    fn transition(&self, next: RenderState) {
        if let Ok(mut state) = self.state.lock() {
            if *state != next {
                debug!("{}: {:?} -> {:?}", self.mount, *state, next);
            }
            *state = next;
        }
    }

    /// Forget the fetched records so the next request fetches again
    pub fn invalidate_data(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    /// Drop cached records and render
    pub async fn refresh(&self) -> RenderOutcome {
        self.invalidate_data();
        self.request_render().await
    }

    /// Process one render request
    pub async fn request_render(&self) -> RenderOutcome {
        let _turn = self.turn.lock().await;

        let raw = self.store.snapshot();
        let Some(selection) = self
            .visualization
            .data_selection(&raw, self.settings.max_records)
        else {
            self.transition(RenderState::Unconfigured);
            let incomplete = VizError::ConfigurationIncomplete {
                field: self.visualization.source_field().to_string(),
            };
            debug!("{}: {}", self.mount, incomplete);
            return RenderOutcome::Placeholder {
                message: self.visualization.placeholder_message(),
            };
        };

        let key = selection.cache_key();
        let series = match self.cached_series(&key) {
            Some(series) => {
                debug!("{}: data selection unchanged, reusing series", self.mount);
                series
            }
            None => {
                let prior = self.state();
                self.transition(RenderState::AwaitingData);
                match self.fetch_series(&selection).await {
                    Ok(series) => {
                        self.store_series(key, series.clone());
                        series
                    }
                    Err(error) => {
                        warn!("{}: {}", self.mount, error);
                        self.transition(prior);
                        return RenderOutcome::Stale { error };
                    }
                }
            }
        };

        if !self.loader.is_loaded() {
            self.transition(RenderState::AwaitingDependencies);
            if let Err(error) = self.wait_for_dependencies().await {
                warn!("{}: not ready: {}", self.mount, error);
                return RenderOutcome::NotReady { error };
            }
        }
        self.transition(RenderState::Ready);

        // Resolve from the configuration as it is now, not as it was before
        // the waits above
        let resolved = resolve(&self.store.snapshot(), &self.visualization.config_schema());
        let options = self.visualization.build_options(&resolved, &series);

        match self.renderer.construct(&self.mount, &options) {
            Ok(handle) => {
                self.constructed.store(true, Ordering::SeqCst);
                self.transition(RenderState::Rendered);
                info!(
                    "{}: rendered {} with {} entries",
                    self.mount,
                    self.visualization.id(),
                    series.len()
                );
                RenderOutcome::Rendered { options, handle }
            }
            Err(e) => {
                let error = VizError::RenderFailed {
                    renderer: self.renderer.id().to_string(),
                    reason: e.to_string(),
                };
                error!("{}: {}", self.mount, error);
                RenderOutcome::Stale { error }
            }
        }
    }

    fn cached_series(&self, key: &str) -> Option<SeriesData> {
        let cached = self.cached.lock().ok()?;
        cached
            .as_ref()
            .filter(|c| c.key == key)
            .map(|c| c.series.clone())
    }

    fn store_series(&self, key: String, series: SeriesData) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(CachedSeries { key, series });
        }
    }

    async fn fetch_series(&self, selection: &DataSelection) -> Result<SeriesData, VizError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let records = match selection {
            DataSelection::Inline(records) => records.clone(),
            DataSelection::Remote(query) => {
                let timeout = self.settings.fetch_timeout();
                match tokio::time::timeout(timeout, self.source.fetch(query)).await {
                    Ok(Ok(records)) => records,
                    Ok(Err(e)) => {
                        return Err(VizError::DataFetchFailed {
                            collection: query.collection.clone(),
                            reason: format!("{:#}", e),
                        })
                    }
                    Err(_) => {
                        return Err(VizError::DataFetchTimedOut {
                            collection: query.collection.clone(),
                            timeout_ms: self.settings.fetch_timeout_ms,
                        })
                    }
                }
            }
        };

        debug!(
            "{}: {} records from {}",
            self.mount,
            records.len(),
            selection.describe()
        );
        Ok(self.visualization.map_records(&records))
    }

    /// Wait for the dependency chain, bounded by the load timeout.
    ///
    /// The chain runs on its own task so a timeout does not abort it; the
    /// load keeps going and a later request picks up its result.
    async fn wait_for_dependencies(&self) -> Result<(), VizError> {
        let loader = Arc::clone(&self.loader);
        let task = tokio::spawn(async move { loader.ensure_loaded().await });

        match tokio::time::timeout(self.settings.load_timeout(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(VizError::DependencyLoadFailed {
                url: self.visualization.id().to_string(),
                reason: join_error.to_string(),
            }),
            Err(_) => Err(VizError::DependencyLoadTimedOut {
                timeout_ms: self.settings.load_timeout_ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyStore;
    use crate::renderers::{JsonRenderer, PageBuffer};
    use crate::sources::InlineRecordSource;
    use crate::webparts::{PieChart, SimpleCarousel};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;
    use vizpart_core::{RecordSource, ResourceFetcher, ResourceHandle, SourceMetadata};
    use vizpart_types::{DataRecord, QuerySpec, RawConfiguration, ResourceDescriptor};

    const SALES: &str = "/_api/lists/GetByTitle('Sales')/items?";

    #[derive(Default)]
    struct CountingFetcher {
        loads: AtomicUsize,
        /// Number of initial loads that fail
        failures: AtomicUsize,
    }

    #[async_trait]
    impl ResourceFetcher for CountingFetcher {
        async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                bail!("connection reset");
            }
            Ok(ResourceHandle::new(descriptor.clone(), None))
        }
    }

    /// Fetcher that parks until released
    struct GatedFetcher {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ResourceFetcher for GatedFetcher {
        async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(ResourceHandle::new(descriptor.clone(), None))
        }
    }

    struct SlowSource {
        metadata: SourceMetadata,
    }

    #[async_trait]
    impl RecordSource for SlowSource {
        fn metadata(&self) -> &SourceMetadata {
            &self.metadata
        }

        async fn fetch(&self, _query: &QuerySpec) -> Result<Vec<DataRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    fn slices() -> Vec<DataRecord> {
        vec![
            DataRecord::new()
                .with("label", "A")
                .with("value", 10)
                .with("color", "#fff")
                .with("hoverColor", "#eee"),
            DataRecord::new()
                .with("label", "B")
                .with("value", 20)
                .with("color", "#f00")
                .with("hoverColor", "#e00"),
            DataRecord::new()
                .with("label", "C")
                .with("value", 30)
                .with("color", "#0f0")
                .with("hoverColor", "#0e0"),
        ]
    }

    struct Harness {
        orchestrator: Arc<RenderOrchestrator>,
        store: Arc<PropertyStore>,
        renderer: Arc<JsonRenderer>,
    }

    fn harness(
        visualization: SharedVisualization,
        raw: RawConfiguration,
        source: SharedRecordSource,
        fetcher: SharedResourceFetcher,
    ) -> Harness {
        let store = Arc::new(PropertyStore::new(raw));
        let renderer = Arc::new(JsonRenderer::new(PageBuffer::new()));
        let orchestrator = RenderOrchestrator::new(OrchestratorParts {
            mount: MountPoint::generate(),
            visualization,
            store: store.clone(),
            source,
            fetcher,
            resources: Arc::new(SharedResourceManager::new()),
            renderer: renderer.clone(),
            settings: AppSettings::default(),
        });
        Harness {
            orchestrator: Arc::new(orchestrator),
            store,
            renderer,
        }
    }

    fn pie_options(outcome: &RenderOutcome) -> &vizpart_types::PieChartOptions {
        match outcome.options() {
            Some(RenderOptions::PieChart(options)) => options,
            _ => panic!("expected a rendered pie chart, got {:?}", outcome),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_calls() {
        let source = Arc::new(InlineRecordSource::new(slices()));
        let fetcher = Arc::new(CountingFetcher::default());
        let h = harness(
            Arc::new(SimpleCarousel::new()),
            RawConfiguration::new().with("query", ""),
            source.clone(),
            fetcher.clone(),
        );

        let outcome = h.orchestrator.request_render().await;

        assert!(matches!(outcome, RenderOutcome::Placeholder { .. }));
        assert_eq!(h.orchestrator.state(), RenderState::Unconfigured);
        assert_eq!(source.fetch_count(), 0);
        assert_eq!(fetcher.loads.load(Ordering::SeqCst), 0);
        assert_eq!(h.renderer.constructions(), 0);
    }

    #[tokio::test]
    async fn test_three_records_rendered_in_order() {
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            Arc::new(InlineRecordSource::new(slices())),
            Arc::new(CountingFetcher::default()),
        );

        let outcome = h.orchestrator.request_render().await;
        let options = pie_options(&outcome);

        assert_eq!(options.data.labels, vec!["A", "B", "C"]);
        assert_eq!(
            options.data.datasets[0].data,
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
        assert_eq!(
            options.data.datasets[0].hover_background_color,
            vec!["#eee", "#e00", "#0e0"]
        );
        assert!(!options.options.legend.display);
        assert_eq!(h.orchestrator.state(), RenderState::Rendered);
        assert!(h.orchestrator.dependencies_loaded());
    }

    #[tokio::test]
    async fn test_inline_items_render_without_source() {
        let source = Arc::new(InlineRecordSource::empty());
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("items", json!([{"Label": "X", "Value": "4"}])),
            source.clone(),
            Arc::new(CountingFetcher::default()),
        );

        let outcome = h.orchestrator.request_render().await;

        assert_eq!(pie_options(&outcome).data.labels, vec!["X"]);
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_render_is_idempotent() {
        let source = Arc::new(InlineRecordSource::new(slices()));
        let fetcher = Arc::new(CountingFetcher::default());
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            source.clone(),
            fetcher.clone(),
        );

        let first = h.orchestrator.request_render().await;
        let second = h.orchestrator.request_render().await;

        assert_eq!(first.options(), second.options());
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(fetcher.loads.load(Ordering::SeqCst), 1);
        // No update API: every cycle constructs afresh
        assert_eq!(h.renderer.constructions(), 2);
    }

    #[tokio::test]
    async fn test_style_change_skips_fetch_and_load() {
        let source = Arc::new(InlineRecordSource::new(slices()));
        let fetcher = Arc::new(CountingFetcher::default());
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            source.clone(),
            fetcher.clone(),
        );
        h.orchestrator.request_render().await;

        h.store.set("legendEnable", json!(true));
        h.store.set("legendSize", json!("16px"));
        let outcome = h.orchestrator.request_render().await;

        let legend = &pie_options(&outcome).options.legend;
        assert!(legend.display);
        assert_eq!(legend.labels.font_size, 16.0);
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(fetcher.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_source_change_refetches() {
        let source = Arc::new(
            InlineRecordSource::new(slices())
                .with_collection("Other", vec![DataRecord::new().with("label", "Z")]),
        );
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            source.clone(),
            Arc::new(CountingFetcher::default()),
        );
        h.orchestrator.request_render().await;

        h.store
            .set("query", json!("/_api/lists/GetByTitle('Other')/items?"));
        let outcome = h.orchestrator.request_render().await;

        assert_eq!(pie_options(&outcome).data.labels, vec!["Z"]);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_prior_render() {
        let source = Arc::new(InlineRecordSource::empty().with_collection("Sales", slices()));
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            source,
            Arc::new(CountingFetcher::default()),
        );
        h.orchestrator.request_render().await;
        let before = h.renderer.page().body(h.orchestrator.mount());

        h.store
            .set("query", json!("/_api/lists/GetByTitle('Gone')/items?"));
        let outcome = h.orchestrator.request_render().await;

        assert!(matches!(
            outcome.error(),
            Some(VizError::DataFetchFailed { collection, .. }) if collection == "Gone"
        ));
        assert!(matches!(outcome, RenderOutcome::Stale { .. }));
        assert_eq!(h.orchestrator.state(), RenderState::Rendered);
        assert_eq!(h.renderer.constructions(), 1);
        assert_eq!(h.renderer.page().body(h.orchestrator.mount()), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let source = Arc::new(SlowSource {
            metadata: SourceMetadata {
                id: "slow".to_string(),
                name: "Slow".to_string(),
                description: String::new(),
            },
        });
        let h = harness(
            Arc::new(SimpleCarousel::new()),
            RawConfiguration::new().with("query", "Pictures"),
            source,
            Arc::new(CountingFetcher::default()),
        );

        let outcome = h.orchestrator.request_render().await;

        assert!(matches!(
            outcome.error(),
            Some(VizError::DataFetchTimedOut { timeout_ms: 10000, .. })
        ));
        assert_eq!(h.orchestrator.state(), RenderState::Unconfigured);
    }

    #[tokio::test]
    async fn test_dependency_failure_is_not_ready_then_retries() {
        let fetcher = Arc::new(CountingFetcher::default());
        fetcher.failures.store(1, Ordering::SeqCst);
        let h = harness(
            Arc::new(SimpleCarousel::new()),
            RawConfiguration::new().with("query", "Pictures"),
            Arc::new(InlineRecordSource::new(Vec::new())),
            fetcher.clone(),
        );

        let outcome = h.orchestrator.request_render().await;
        assert!(matches!(outcome, RenderOutcome::NotReady { .. }));
        assert!(outcome.error().is_some_and(VizError::is_dependency_error));
        assert_eq!(h.orchestrator.state(), RenderState::AwaitingDependencies);
        assert_eq!(h.renderer.constructions(), 0);

        let retry = h.orchestrator.request_render().await;
        assert!(retry.is_rendered());
        // Five resources, the first attempted twice
        assert_eq!(fetcher.loads.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_carousel_flat_file_columns_survive_projection() {
        let source = Arc::new(InlineRecordSource::new(vec![
            DataRecord::new()
                .with("Title", "")
                .with("Description", "")
                .with("fileUrl", "/sites/home/Pictures/photo.jpg")
                .with("Author", "someone"),
            DataRecord::new()
                .with("Title", "")
                .with("FileRef", "/sites/home/Pictures/raw/IMG_1.png")
                .with("FileLeafRef", "Harbour.png"),
        ]));
        let h = harness(
            Arc::new(SimpleCarousel::new()),
            RawConfiguration::new().with("query", "/_api/lists/GetByTitle('Pictures')/items?"),
            source,
            Arc::new(CountingFetcher::default()),
        );

        let outcome = h.orchestrator.request_render().await;

        let items = match outcome.options() {
            Some(RenderOptions::Carousel(options)) => &options.items,
            other => panic!("expected carousel options, got {:?}", other),
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].caption, "photo.jpg");
        assert_eq!(items[0].image_url, "/sites/home/Pictures/photo.jpg");
        assert_eq!(items[1].caption, "Harbour.png");
        assert_eq!(items[1].image_url, "/sites/home/Pictures/raw/IMG_1.png");
    }

    #[tokio::test]
    async fn test_latest_config_applied_after_wait() {
        let fetcher = Arc::new(GatedFetcher {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            Arc::new(InlineRecordSource::new(slices())),
            fetcher.clone(),
        );

        let orchestrator = h.orchestrator.clone();
        let pending = tokio::spawn(async move { orchestrator.request_render().await });

        fetcher.entered.notified().await;
        assert_eq!(h.orchestrator.state(), RenderState::AwaitingDependencies);
        h.store.set("titleEnable", json!(true));
        h.store.set("title", json!("Edited while loading"));
        fetcher.release.notify_one();

        let outcome = pending.await.unwrap();
        let title = &pie_options(&outcome).options.title;
        assert!(title.display);
        assert_eq!(title.text, "Edited while loading");
    }

    #[tokio::test]
    async fn test_requests_share_one_dependency_load() {
        let fetcher = Arc::new(GatedFetcher {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let h = harness(
            Arc::new(PieChart::new()),
            RawConfiguration::new().with("query", SALES),
            Arc::new(InlineRecordSource::new(slices())),
            fetcher.clone(),
        );

        let first = tokio::spawn({
            let orchestrator = h.orchestrator.clone();
            async move { orchestrator.request_render().await }
        });
        fetcher.entered.notified().await;
        let second = tokio::spawn({
            let orchestrator = h.orchestrator.clone();
            async move { orchestrator.request_render().await }
        });
        fetcher.release.notify_one();

        let first = first.await.unwrap();
        let second = second.await.unwrap();
        let (Some(a), Some(b)) = (first.options(), second.options()) else {
            panic!("both requests should render");
        };
        assert_eq!(a, b);
        assert_eq!(h.renderer.constructions(), 2);
    }
}
