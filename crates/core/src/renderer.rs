//! Renderer trait and related types

use crate::mount::MountPoint;
use anyhow::Result;
use std::sync::Arc;
use vizpart_types::RenderOptions;

/// Returned by a successful construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHandle {
    /// Renderer that produced the visualization
    pub renderer: String,
    pub mount: MountPoint,
    /// Construction counter of the renderer, starting at 1
    pub sequence: u64,
}

/// Trait for third-party renderers
///
/// No update API is assumed: every render cycle constructs a fresh
/// visualization against the mount point.
pub trait Renderer: Send + Sync {
    /// Unique identifier for this renderer
    fn id(&self) -> &str;

    /// Construct the visualization on the mount point
    fn construct(&self, mount: &MountPoint, options: &RenderOptions) -> Result<RenderHandle>;

    /// Show a descriptive placeholder instead of a visualization
    fn show_placeholder(&self, _mount: &MountPoint, _message: &str) -> Result<()> {
        Ok(())
    }

    /// Show a non-fatal message region next to the current visualization
    fn show_message(&self, _mount: &MountPoint, _message: &str) -> Result<()> {
        Ok(())
    }
}

pub type SharedRenderer = Arc<dyn Renderer>;
