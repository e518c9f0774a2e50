//! Built-in web parts
//!
//! Each web part is a [`Visualization`](vizpart_core::Visualization): an
//! option schema with defaults, a data selection rule, the external
//! resources its renderer needs and the translation into renderer options.

mod carousel;
mod pie_chart;

pub use carousel::{CarouselSettings, SimpleCarousel, DEFAULT_CAROUSEL_FONT};
pub use pie_chart::{PieChart, PieChartSettings, DEFAULT_CHART_FONT};

use log::warn;
use serde::de::DeserializeOwned;
use vizpart_core::register_visualization;
use vizpart_types::ResolvedConfiguration;

/// Read resolved options into a typed settings struct.
///
/// Resolution already guarantees every field has the right type, so the
/// fallback only triggers if a schema and its struct drift apart.
pub(crate) fn typed_settings<T>(id: &str, resolved: &ResolvedConfiguration) -> T
where
    T: DeserializeOwned + Default,
{
    resolved.to_typed().unwrap_or_else(|e| {
        warn!("{}: resolved options unreadable ({}), using defaults", id, e);
        T::default()
    })
}

/// Register all built-in web parts with the global registry
pub fn register_all() {
    register_visualization(|| Box::new(PieChart::new()));
    register_visualization(|| Box::new(SimpleCarousel::new()));
}
