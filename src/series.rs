//! Record-to-series mapping
//!
//! One output entry per input record, in input order. Nothing is filtered
//! or de-duplicated and the input is never modified.

use vizpart_types::{ChartSeries, DataRecord, GalleryItem, PictureRecord, SeriesData};

/// Which series shape a renderer consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Chart,
    Gallery,
}

/// Map records to the series shape of `kind`
pub fn map_records(records: &[DataRecord], kind: SeriesKind) -> SeriesData {
    match kind {
        SeriesKind::Chart => SeriesData::Chart(map_chart_records(records)),
        SeriesKind::Gallery => SeriesData::Gallery(map_gallery_records(records)),
    }
}

/// Parallel label/value/color/hover-color sequences
pub fn map_chart_records(records: &[DataRecord]) -> ChartSeries {
    let mut series = ChartSeries {
        labels: Vec::with_capacity(records.len()),
        values: Vec::with_capacity(records.len()),
        colors: Vec::with_capacity(records.len()),
        hover_colors: Vec::with_capacity(records.len()),
    };

    for record in records {
        let item = record.chart_view();
        series.labels.push(item.label);
        series.values.push(item.value);
        series.colors.push(item.color);
        series.hover_colors.push(item.hover_color);
    }

    series
}

/// One slide per picture record
pub fn map_gallery_records(records: &[DataRecord]) -> Vec<GalleryItem> {
    records
        .iter()
        .map(|record| {
            let picture = record.picture_view();
            GalleryItem {
                caption: caption_for(&picture),
                image_url: picture.file_url,
            }
        })
        .collect()
}

/// Caption chain: title, else description, else the file name. Only a
/// missing or empty string falls through; whitespace is a caption.
pub fn caption_for(picture: &PictureRecord) -> String {
    let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

    non_empty(&picture.title)
        .or_else(|| non_empty(&picture.description))
        .unwrap_or_else(|| picture.derived_file_name())
}
