//! Change notifier
//!
//! Editors call back into a web part long after it was constructed, from
//! code that knows nothing about the instance. The notifier captures the
//! store and the render-request queue once, and [`ChangeNotifier::callback`]
//! hands out a closure that owns those captures, so it works the same no
//! matter who invokes it or when.

use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use vizpart_core::{ConfigurationStore, MountPoint};

/// Why a render was requested
#[derive(Debug, Clone, PartialEq)]
pub enum RenderReason {
    /// The host framework asked for a render
    Host,
    /// A configuration field was edited
    FieldChanged { field: String },
    /// Cached records should be dropped before rendering
    Refresh,
}

/// One queued render request
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub mount: MountPoint,
    pub reason: RenderReason,
}

/// Callback handed to property editors
pub type PropertyChangeCallback = Arc<dyn Fn(&str, Value) + Send + Sync>;

#[derive(Clone)]
pub struct ChangeNotifier {
    store: Arc<dyn ConfigurationStore>,
    requests: mpsc::UnboundedSender<RenderRequest>,
    owner: MountPoint,
}

impl ChangeNotifier {
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        requests: mpsc::UnboundedSender<RenderRequest>,
        owner: MountPoint,
    ) -> Self {
        Self {
            store,
            requests,
            owner,
        }
    }

    /// Write `value` under `field`, then queue a re-render
    pub fn on_field_changed(&self, field: &str, value: Value) {
        debug!("{}: field '{}' changed to {}", self.owner, field, value);
        self.store.set(field, value);
        self.request(RenderReason::FieldChanged {
            field: field.to_string(),
        });
    }

    /// Queue a render request for the owning instance
    pub fn request(&self, reason: RenderReason) {
        let request = RenderRequest {
            mount: self.owner.clone(),
            reason,
        };
        if self.requests.send(request).is_err() {
            warn!("{}: render queue closed, request dropped", self.owner);
        }
    }

    /// A free-standing callback bound to this instance
    pub fn callback(&self) -> PropertyChangeCallback {
        let notifier = self.clone();
        Arc::new(move |field: &str, value: Value| notifier.on_field_changed(field, value))
    }

    pub fn owner(&self) -> &MountPoint {
        &self.owner
    }
}
