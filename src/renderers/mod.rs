//! Renderers and the page buffer they draw into

mod html;
mod json;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use vizpart_core::MountPoint;

/// What is currently shown on one mount point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountContent {
    /// Constructed visualization or placeholder
    pub body: String,
    /// Non-fatal message shown next to the body
    pub message: Option<String>,
}

/// In-memory page: one content slot per mount point
#[derive(Debug, Clone, Default)]
pub struct PageBuffer {
    mounts: Arc<Mutex<BTreeMap<String, MountContent>>>,
}

impl PageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the body of a mount point and clear its message
    pub fn set_body(&self, mount: &MountPoint, body: String) {
        if let Ok(mut mounts) = self.mounts.lock() {
            mounts.insert(
                mount.id().to_string(),
                MountContent {
                    body,
                    message: None,
                },
            );
        }
    }

    /// Show a message without touching the body
    pub fn set_message(&self, mount: &MountPoint, message: String) {
        if let Ok(mut mounts) = self.mounts.lock() {
            mounts.entry(mount.id().to_string()).or_default().message = Some(message);
        }
    }

    pub fn get(&self, mount: &MountPoint) -> Option<MountContent> {
        self.mounts.lock().ok()?.get(mount.id()).cloned()
    }

    pub fn body(&self, mount: &MountPoint) -> Option<String> {
        self.get(mount).map(|content| content.body)
    }

    pub fn len(&self) -> usize {
        self.mounts.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
