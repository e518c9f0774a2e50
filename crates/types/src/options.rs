//! Renderer option contracts.
//!
//! These structs serialize to the exact option documents the third-party
//! renderers accept (Chart.js 2.x for the pie chart, Unite Gallery's carousel
//! theme for the carousel). They are built fresh on every render and never
//! mutated afterwards.

use crate::series::GalleryItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canvas dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub data: Vec<Option<f64>>,
    pub background_color: Vec<String>,
    pub hover_background_color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOptions {
    pub animate_rotate: bool,
    pub animate_scale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
    pub position: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendLabelOptions {
    pub font_color: String,
    pub font_family: String,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: String,
    pub labels: LegendLabelOptions,
}

/// Chart-level behavior plus the title and legend sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChartBehavior {
    pub responsive: bool,
    pub cutout_percentage: f64,
    pub animation: AnimationOptions,
    pub title: TitleOptions,
    pub legend: LegendOptions,
}

/// Everything needed to construct a pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChartOptions {
    pub canvas: CanvasSize,
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: PieChartData,
    pub options: PieChartBehavior,
}

impl PieChartOptions {
    /// The document passed to `new Chart(ctx, ...)`
    pub fn chart_config(&self) -> serde_json::Result<Value> {
        Ok(serde_json::json!({
            "type": self.chart_type,
            "data": serde_json::to_value(&self.data)?,
            "options": serde_json::to_value(&self.options)?,
        }))
    }
}

/// Unite Gallery carousel theme options, keyed exactly as the library expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniteGalleryOptions {
    pub gallery_theme: String,
    pub theme_enable_navigation: bool,
    pub carousel_autoplay: bool,
    pub carousel_autoplay_timeout: f64,
    pub carousel_autoplay_pause_onhover: bool,
    pub tile_enable_icons: bool,
    pub tile_width: f64,
    pub tile_height: f64,
    pub tile_enable_border: bool,
    pub tile_border_width: f64,
    pub tile_border_color: String,
    pub tile_enable_textpanel: bool,
    pub tile_textpanel_always_on: bool,
    pub tile_textpanel_bg_color: String,
    pub tile_textpanel_bg_opacity: f64,
    pub tile_textpanel_title_color: String,
    pub tile_textpanel_title_font_family: String,
    pub tile_textpanel_title_text_align: String,
    pub tile_textpanel_title_font_size: f64,
}

/// Everything needed to construct a carousel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselOptions {
    pub gallery: UniteGalleryOptions,
    /// Slides in source order
    pub items: Vec<GalleryItem>,
}

/// Renderer-specific options for one render cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOptions {
    PieChart(PieChartOptions),
    Carousel(CarouselOptions),
}

impl RenderOptions {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderOptions::PieChart(_) => "pie_chart",
            RenderOptions::Carousel(_) => "carousel",
        }
    }
}
