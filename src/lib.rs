//! vizpart: configuration-driven chart and carousel web parts
//!
//! This library turns a web part's property bag into the options of a
//! third-party renderer, including:
//! - Default resolution of every styling option
//! - Record-to-series mapping for charts and galleries
//! - Ordered, load-once dependency loading
//! - The per-instance render state machine and change notification
//! - Built-in pie chart and simple carousel web parts

pub mod config;
pub mod fetchers;
pub mod host;
pub mod loader;
pub mod notifier;
pub mod orchestrator;
pub mod renderers;
pub mod series;
pub mod sources;
pub mod webparts;

// Re-export commonly used types
pub use config::{resolve, AppSettings, PropertyStore};
pub use host::{HostContext, WebPartHost};
pub use loader::DependencyLoader;
pub use notifier::{ChangeNotifier, PropertyChangeCallback, RenderReason, RenderRequest};
pub use orchestrator::{RenderOrchestrator, RenderOutcome, RenderState};
pub use series::{map_records, SeriesKind};
