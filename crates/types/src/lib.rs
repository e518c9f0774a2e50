//! vizpart-types: Shared data types for vizpart web parts.
//!
//! This crate contains pure data types (property bags, data records, query
//! specs, option schemas and renderer option contracts) that are shared by
//! all vizpart crates. Nothing here performs I/O or needs a runtime.

pub mod options;
pub mod property;
pub mod query;
pub mod record;
pub mod resource;
pub mod schema;
pub mod series;

// Re-export commonly used types at the crate root for convenience
pub use options::{
    AnimationOptions, CanvasSize, CarouselOptions, ChartDataset, LegendLabelOptions,
    LegendOptions, PieChartBehavior, PieChartData, PieChartOptions, RenderOptions, TitleOptions,
    UniteGalleryOptions,
};
pub use property::{RawConfiguration, ResolvedConfiguration};
pub use query::{FieldFilter, FilterOp, OrderBy, QuerySpec, PICTURE_EXPAND, PICTURE_PROJECTION};
pub use record::{ChartRecord, DataRecord, PictureRecord};
pub use resource::{ResourceDescriptor, ResourceKind};
pub use schema::{ConfigSchema, OptionKind, OptionSpec};
pub use series::{ChartSeries, GalleryItem, SeriesData};
