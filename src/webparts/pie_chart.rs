//! Pie chart web part (Chart.js 2.x)

use crate::series::{map_records, SeriesKind};
use crate::webparts::typed_settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vizpart_core::{DataSelection, Visualization};
use vizpart_types::{
    AnimationOptions, CanvasSize, ChartDataset, ConfigSchema, DataRecord, LegendLabelOptions,
    LegendOptions, OptionSpec, PieChartBehavior, PieChartData, PieChartOptions, QuerySpec,
    RawConfiguration, RenderOptions, ResolvedConfiguration, ResourceDescriptor, SeriesData,
    TitleOptions,
};

pub const DEFAULT_CHART_FONT: &str = "'Helvetica Neue', 'Helvetica', 'Arial', sans-serif";
pub const DEFAULT_CHART_FONT_COLOR: &str = "#666";
pub const CHART_SCRIPT_PATH: &str = "Chart.js/2.3.0/Chart.min.js";

/// Fields requested when chart items come from a list
const CHART_PROJECTION: &[&str] = &["Label", "Value", "Color", "HoverColor"];

const POSITIONS: &[&str] = &["top", "left", "bottom", "right"];

/// Resolved pie chart properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PieChartSettings {
    pub responsive: bool,
    pub width: f64,
    pub height: f64,
    pub cutout_percentage: f64,
    pub animate_rotate: bool,
    pub animate_scale: bool,

    pub title_enable: bool,
    pub title: String,
    pub position: String,
    pub title_font: String,
    pub title_size: f64,
    pub title_color: String,

    pub legend_enable: bool,
    pub legend_position: String,
    pub legend_font: String,
    pub legend_size: f64,
    pub legend_color: String,
}

impl Default for PieChartSettings {
    fn default() -> Self {
        Self {
            responsive: false,
            width: 300.0,
            height: 300.0,
            cutout_percentage: 0.0,
            animate_rotate: true,
            animate_scale: false,
            title_enable: false,
            title: String::new(),
            position: "top".to_string(),
            title_font: DEFAULT_CHART_FONT.to_string(),
            title_size: 12.0,
            title_color: DEFAULT_CHART_FONT_COLOR.to_string(),
            legend_enable: false,
            legend_position: "top".to_string(),
            legend_font: DEFAULT_CHART_FONT.to_string(),
            legend_size: 12.0,
            legend_color: DEFAULT_CHART_FONT_COLOR.to_string(),
        }
    }
}

impl PieChartSettings {
    pub fn schema() -> ConfigSchema {
        let d = Self::default();
        ConfigSchema::new(vec![
            OptionSpec::boolean("responsive", "Responsive", d.responsive),
            OptionSpec::number("width", "Width", 1.0, 800.0, d.width),
            OptionSpec::number("height", "Height", 1.0, 800.0, d.height),
            OptionSpec::number(
                "cutoutPercentage",
                "Cutout percentage",
                0.0,
                99.0,
                d.cutout_percentage,
            ),
            OptionSpec::boolean("animateRotate", "Animate rotation", d.animate_rotate),
            OptionSpec::boolean("animateScale", "Animate scale", d.animate_scale),
            OptionSpec::boolean("titleEnable", "Display title", d.title_enable),
            OptionSpec::text("title", "Title", &d.title, true),
            OptionSpec::choice("position", "Title position", POSITIONS, &d.position),
            OptionSpec::text("titleFont", "Title font", &d.title_font, false),
            OptionSpec::font_size("titleSize", "Title font size", d.title_size),
            OptionSpec::color("titleColor", "Title color", &d.title_color),
            OptionSpec::boolean("legendEnable", "Display legend", d.legend_enable),
            OptionSpec::choice(
                "legendPosition",
                "Legend position",
                POSITIONS,
                &d.legend_position,
            ),
            OptionSpec::text("legendFont", "Legend font", &d.legend_font, false),
            OptionSpec::font_size("legendSize", "Legend font size", d.legend_size),
            OptionSpec::color("legendColor", "Legend color", &d.legend_color),
        ])
    }
}

/// Pie chart over configured items or a list query
pub struct PieChart {
    id: String,
    name: String,
}

impl PieChart {
    pub fn new() -> Self {
        Self {
            id: "pie_chart".to_string(),
            name: "Pie Chart".to_string(),
        }
    }

    fn inline_records(items: &[Value]) -> Vec<DataRecord> {
        // Keep one record per item so the slice count matches the item count
        items
            .iter()
            .map(|item| DataRecord::from_json(item.clone()).unwrap_or_default())
            .collect()
    }
}

impl Default for PieChart {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualization for PieChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config_schema(&self) -> ConfigSchema {
        PieChartSettings::schema()
    }

    fn source_field(&self) -> &str {
        "items"
    }

    fn placeholder_message(&self) -> String {
        "Add chart items in the web part properties to display a pie chart.".to_string()
    }

    fn data_selection(&self, raw: &RawConfiguration, max_records: usize) -> Option<DataSelection> {
        if let Some(query) = raw.text("query").and_then(QuerySpec::parse) {
            return Some(DataSelection::Remote(
                query
                    .with_projection(CHART_PROJECTION, &[])
                    .capped(max_records),
            ));
        }

        match raw.get("items")? {
            Value::Array(items) => Some(DataSelection::Inline(Self::inline_records(items))),
            _ => None,
        }
    }

    fn dependencies(&self, cdn_base: &str) -> Vec<ResourceDescriptor> {
        vec![ResourceDescriptor::script(
            format!("{}/{}", cdn_base, CHART_SCRIPT_PATH),
            "Chart",
        )]
    }

    fn map_records(&self, records: &[DataRecord]) -> SeriesData {
        map_records(records, SeriesKind::Chart)
    }

    fn build_options(
        &self,
        resolved: &ResolvedConfiguration,
        series: &SeriesData,
    ) -> RenderOptions {
        let settings: PieChartSettings = typed_settings(self.id(), resolved);
        let series = match series {
            SeriesData::Chart(series) => series.clone(),
            SeriesData::Gallery(_) => Default::default(),
        };

        RenderOptions::PieChart(PieChartOptions {
            canvas: CanvasSize {
                width: settings.width,
                height: settings.height,
            },
            chart_type: "pie".to_string(),
            data: PieChartData {
                labels: series.labels,
                datasets: vec![ChartDataset {
                    data: series.values,
                    background_color: series.colors,
                    hover_background_color: series.hover_colors,
                }],
            },
            options: PieChartBehavior {
                responsive: settings.responsive,
                cutout_percentage: settings.cutout_percentage,
                animation: AnimationOptions {
                    animate_rotate: settings.animate_rotate,
                    animate_scale: settings.animate_scale,
                },
                title: TitleOptions {
                    display: settings.title_enable,
                    text: settings.title,
                    position: settings.position,
                    font_family: settings.title_font,
                    font_size: settings.title_size,
                    font_color: settings.title_color,
                },
                legend: LegendOptions {
                    display: settings.legend_enable,
                    position: settings.legend_position,
                    labels: LegendLabelOptions {
                        font_color: settings.legend_color,
                        font_family: settings.legend_font,
                        font_size: settings.legend_size,
                    },
                },
            },
        })
    }
}
