//! Normalised series structures consumed by renderers

use serde::{Deserialize, Serialize};

/// Parallel sequences, one element per chart record, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub colors: Vec<String>,
    pub hover_colors: Vec<String>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One carousel slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Display caption, also used as alt text
    pub caption: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum SeriesData {
    Chart(ChartSeries),
    Gallery(Vec<GalleryItem>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Chart(series) => series.len(),
            SeriesData::Gallery(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
