//! Error taxonomy for the render pipeline.
//!
//! None of these reach the page as a failure: the orchestrator turns each one
//! into a placeholder, a stale visualization or a message region.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VizError {
    /// The required source selection is missing. A valid placeholder state.
    #[error("configuration incomplete: `{field}` is not set")]
    ConfigurationIncomplete { field: String },

    #[error("data fetch failed for `{collection}`: {reason}")]
    DataFetchFailed { collection: String, reason: String },

    #[error("data fetch for `{collection}` did not complete within {timeout_ms} ms")]
    DataFetchTimedOut { collection: String, timeout_ms: u64 },

    #[error("failed to load `{url}`: {reason}")]
    DependencyLoadFailed { url: String, reason: String },

    #[error("dependencies did not finish loading within {timeout_ms} ms")]
    DependencyLoadTimedOut { timeout_ms: u64 },

    /// Logged and replaced by the default, never surfaced
    #[error("malformed value for `{field}`: {value}")]
    MalformedConfigurationValue { field: String, value: String },

    #[error("renderer `{renderer}` failed: {reason}")]
    RenderFailed { renderer: String, reason: String },
}

impl VizError {
    /// Whether the visualization cannot be shown until dependencies load
    pub fn is_dependency_error(&self) -> bool {
        matches!(
            self,
            VizError::DependencyLoadFailed { .. } | VizError::DependencyLoadTimedOut { .. }
        )
    }
}

pub type VizResult<T> = std::result::Result<T, VizError>;
