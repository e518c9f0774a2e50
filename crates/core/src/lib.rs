//! vizpart-core: Core traits and registries for vizpart.
//!
//! This crate contains the collaborator traits (ConfigurationStore,
//! RecordSource, ResourceFetcher, Renderer), the Visualization trait, the
//! error taxonomy, the page-global shared resource manager and the
//! visualization registry.

pub mod error;
mod data_source;
mod mount;
mod registry;
mod renderer;
mod resource;
mod shared_resource_manager;
mod store;
mod visualization;

pub use data_source::{RecordSource, SharedRecordSource, SourceMetadata};
pub use error::{VizError, VizResult};
pub use mount::MountPoint;
pub use registry::{
    create_visualization, list_visualizations, register_visualization, Registry,
    VisualizationFactory, VisualizationInfo,
};
pub use renderer::{RenderHandle, Renderer, SharedRenderer};
pub use resource::{ResourceFetcher, ResourceHandle, SharedResourceFetcher};
pub use shared_resource_manager::{global_resource_manager, SharedResource, SharedResourceManager};
pub use store::ConfigurationStore;
pub use visualization::{BoxedVisualization, DataSelection, SharedVisualization, Visualization};

// Re-export types used in trait signatures for convenience
pub use vizpart_types::{
    ConfigSchema, DataRecord, QuerySpec, RawConfiguration, RenderOptions, ResolvedConfiguration,
    ResourceDescriptor, SeriesData,
};
