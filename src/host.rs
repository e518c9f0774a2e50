//! Host adapter
//!
//! The boundary between a page framework and the orchestrator. The framework
//! constructs a [`WebPartHost`] from a [`HostContext`], calls
//! [`WebPartHost::render`] whenever it wants output, and hands the property
//! editor the callback from [`WebPartHost::change_callback`]. Edits queue
//! render requests that [`WebPartHost::drain`] or [`WebPartHost::run`]
//! processes.

use crate::config::AppSettings;
use crate::notifier::{ChangeNotifier, PropertyChangeCallback, RenderReason, RenderRequest};
use crate::orchestrator::{OrchestratorParts, RenderOrchestrator, RenderOutcome, RenderState};
use anyhow::Result;
use log::{debug, error, trace, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use vizpart_core::{
    create_visualization, global_resource_manager, ConfigurationStore, MountPoint,
    SharedRecordSource, SharedRenderer, SharedResourceFetcher, SharedResourceManager,
    SharedVisualization,
};

/// Everything the hosting page supplies to a web part
#[derive(Clone)]
pub struct HostContext {
    pub store: Arc<dyn ConfigurationStore>,
    pub source: SharedRecordSource,
    pub fetcher: SharedResourceFetcher,
    pub renderer: SharedRenderer,
    /// Load-once registry shared by all web parts on the page
    pub resources: Arc<SharedResourceManager>,
    pub settings: AppSettings,
}

impl HostContext {
    /// Context using the process-wide resource manager and default settings
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        source: SharedRecordSource,
        fetcher: SharedResourceFetcher,
        renderer: SharedRenderer,
    ) -> Self {
        Self {
            store,
            source,
            fetcher,
            renderer,
            resources: global_resource_manager(),
            settings: AppSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_resources(mut self, resources: Arc<SharedResourceManager>) -> Self {
        self.resources = resources;
        self
    }
}

pub struct WebPartHost {
    orchestrator: RenderOrchestrator,
    renderer: SharedRenderer,
    notifier: ChangeNotifier,
    requests: Mutex<mpsc::UnboundedReceiver<RenderRequest>>,
}

impl WebPartHost {
    /// Create a web part of a registered kind
    pub fn new(kind: &str, ctx: HostContext) -> Result<Self> {
        let visualization: SharedVisualization = Arc::from(create_visualization(kind)?);
        Ok(Self::with_visualization(visualization, ctx))
    }

    pub fn with_visualization(visualization: SharedVisualization, ctx: HostContext) -> Self {
        let mount = MountPoint::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        let notifier = ChangeNotifier::new(ctx.store.clone(), tx, mount.clone());
        debug!("Created {} web part on {}", visualization.id(), mount);

        let orchestrator = RenderOrchestrator::new(OrchestratorParts {
            mount,
            visualization,
            store: ctx.store,
            source: ctx.source,
            fetcher: ctx.fetcher,
            resources: ctx.resources,
            renderer: ctx.renderer.clone(),
            settings: ctx.settings,
        });

        Self {
            orchestrator,
            renderer: ctx.renderer,
            notifier,
            requests: Mutex::new(rx),
        }
    }

    pub fn mount(&self) -> &MountPoint {
        self.orchestrator.mount()
    }

    pub fn state(&self) -> RenderState {
        self.orchestrator.state()
    }

    pub fn orchestrator(&self) -> &RenderOrchestrator {
        &self.orchestrator
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Callback for the property editor, bound to this web part
    pub fn change_callback(&self) -> PropertyChangeCallback {
        self.notifier.callback()
    }

    /// Framework render entry point
    pub async fn render(&self) -> RenderOutcome {
        let outcome = self.orchestrator.request_render().await;
        self.present(&outcome);
        outcome
    }

    /// Drop cached records and render
    pub async fn refresh(&self) -> RenderOutcome {
        let outcome = self.orchestrator.refresh().await;
        self.present(&outcome);
        outcome
    }

    /// Process every queued request. Requests that piled up while the
    /// previous render was waiting collapse into one render against the
    /// latest configuration.
    pub async fn drain(&self) -> Option<RenderOutcome> {
        let mut requests = self.requests.lock().await;
        let mut pending = Vec::new();
        while let Ok(request) = requests.try_recv() {
            pending.push(request);
        }
        drop(requests);

        if pending.is_empty() {
            return None;
        }
        Some(self.handle(pending).await)
    }

    /// Serve render requests until the queue closes
    pub async fn run(&self) {
        loop {
            let mut requests = self.requests.lock().await;
            let Some(first) = requests.recv().await else {
                break;
            };
            let mut pending = vec![first];
            while let Ok(request) = requests.try_recv() {
                pending.push(request);
            }
            drop(requests);

            let start = Instant::now();
            self.handle(pending).await;
            trace!("Render cycle took {:?}", start.elapsed());
        }
    }

    async fn handle(&self, pending: Vec<RenderRequest>) -> RenderOutcome {
        trace!("{}: {} queued render requests", self.mount(), pending.len());
        if pending.iter().any(|r| r.reason == RenderReason::Refresh) {
            self.orchestrator.invalidate_data();
        }
        self.render().await
    }

    fn present(&self, outcome: &RenderOutcome) {
        let mount = self.mount();
        let result = match outcome {
            RenderOutcome::Placeholder { message } => self.renderer.show_placeholder(mount, message),
            RenderOutcome::Stale { error } => self.renderer.show_message(mount, &error.to_string()),
            RenderOutcome::NotReady { error } => {
                warn!("{}: keeping placeholder, {}", mount, error);
                if self.orchestrator.has_rendered() {
                    Ok(())
                } else {
                    let message = format!("Loading {}...", self.orchestrator.visualization().name());
                    self.renderer.show_placeholder(mount, &message)
                }
            }
            RenderOutcome::Rendered { .. } => Ok(()),
        };
        if let Err(e) = result {
            error!("{}: failed to present outcome: {}", mount, e);
        }
    }
}
