//! Simple carousel web part (Unite Gallery carousel theme over a picture library)

use crate::series::{map_records, SeriesKind};
use crate::webparts::typed_settings;
use serde::{Deserialize, Serialize};
use vizpart_core::{DataSelection, Visualization};
use vizpart_types::{
    CarouselOptions, ConfigSchema, DataRecord, OptionSpec, QuerySpec, RawConfiguration,
    RenderOptions, ResolvedConfiguration, ResourceDescriptor, SeriesData, UniteGalleryOptions,
    PICTURE_EXPAND, PICTURE_PROJECTION,
};

pub const DEFAULT_CAROUSEL_FONT: &str = "'Segoe UI', 'Helvetica Neue', 'Arial', sans-serif";
const UNITE_GALLERY: &str = "unitegallery/1.7.28";
const JQUERY: &str = "jquery/3.1.1/jquery.min.js";

/// Resolved carousel properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselSettings {
    pub enable_arrows: bool,
    pub enable_icons: bool,
    pub tile_width: f64,
    pub tile_height: f64,
    pub pause_on_mouseover: bool,
    pub autoplay: bool,
    /// Autoplay interval in milliseconds
    pub speed: f64,

    pub text_panel_enable: bool,
    pub text_panel_always_on_top: bool,
    pub text_panel_opacity: f64,
    pub text_panel_align: String,
    pub text_panel_font: String,
    pub text_panel_font_size: f64,
    pub text_panel_font_color: String,
    pub text_panel_background_color: String,

    pub enable_border: bool,
    pub border: f64,
    pub border_color: String,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            enable_arrows: true,
            enable_icons: true,
            tile_width: 160.0,
            tile_height: 160.0,
            pause_on_mouseover: true,
            autoplay: true,
            speed: 3000.0,
            text_panel_enable: true,
            text_panel_always_on_top: false,
            text_panel_opacity: 0.4,
            text_panel_align: "center".to_string(),
            text_panel_font: DEFAULT_CAROUSEL_FONT.to_string(),
            text_panel_font_size: 14.0,
            text_panel_font_color: "#ffffff".to_string(),
            text_panel_background_color: "#000000".to_string(),
            enable_border: true,
            border: 3.0,
            border_color: "#F0F0F0".to_string(),
        }
    }
}

impl CarouselSettings {
    pub fn schema() -> ConfigSchema {
        let d = Self::default();
        ConfigSchema::new(vec![
            OptionSpec::boolean("enableArrows", "Navigation arrows", d.enable_arrows),
            OptionSpec::boolean("enableIcons", "Tile icons", d.enable_icons),
            OptionSpec::number("tileWidth", "Tile width", 1.0, 500.0, d.tile_width),
            OptionSpec::number("tileHeight", "Tile height", 1.0, 500.0, d.tile_height),
            OptionSpec::boolean("pauseOnMouseover", "Pause on mouse over", d.pause_on_mouseover),
            OptionSpec::boolean("autoplay", "Autoplay", d.autoplay),
            OptionSpec::number("speed", "Autoplay speed", 0.0, 7000.0, d.speed),
            OptionSpec::boolean("textPanelEnable", "Text panel", d.text_panel_enable),
            OptionSpec::boolean(
                "textPanelAlwaysOnTop",
                "Text panel always visible",
                d.text_panel_always_on_top,
            ),
            OptionSpec::number(
                "textPanelOpacity",
                "Text panel opacity",
                0.0,
                1.0,
                d.text_panel_opacity,
            ),
            OptionSpec::choice(
                "textPanelAlign",
                "Text alignment",
                &["left", "center", "right"],
                &d.text_panel_align,
            ),
            OptionSpec::text("textPanelFont", "Text font", &d.text_panel_font, false),
            OptionSpec::font_size("textPanelFontSize", "Text font size", d.text_panel_font_size),
            OptionSpec::color("textPanelFontColor", "Text color", &d.text_panel_font_color),
            OptionSpec::color(
                "textPanelBackgroundColor",
                "Text panel background",
                &d.text_panel_background_color,
            ),
            OptionSpec::boolean("enableBorder", "Tile border", d.enable_border),
            OptionSpec::number("border", "Border width", 0.0, 50.0, d.border),
            OptionSpec::color("borderColor", "Border color", &d.border_color),
        ])
    }

    fn gallery_options(&self) -> UniteGalleryOptions {
        UniteGalleryOptions {
            gallery_theme: "carousel".to_string(),
            theme_enable_navigation: self.enable_arrows,
            carousel_autoplay: self.autoplay,
            carousel_autoplay_timeout: self.speed,
            carousel_autoplay_pause_onhover: self.pause_on_mouseover,
            tile_enable_icons: self.enable_icons,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            tile_enable_border: self.enable_border,
            tile_border_width: self.border,
            tile_border_color: self.border_color.clone(),
            tile_enable_textpanel: self.text_panel_enable,
            tile_textpanel_always_on: self.text_panel_always_on_top,
            tile_textpanel_bg_color: self.text_panel_background_color.clone(),
            tile_textpanel_bg_opacity: self.text_panel_opacity,
            tile_textpanel_title_color: self.text_panel_font_color.clone(),
            tile_textpanel_title_font_family: self.text_panel_font.clone(),
            tile_textpanel_title_text_align: self.text_panel_align.clone(),
            tile_textpanel_title_font_size: self.text_panel_font_size,
        }
    }
}

pub struct SimpleCarousel {
    id: String,
    name: String,
}

impl SimpleCarousel {
    pub fn new() -> Self {
        Self {
            id: "simple_carousel".to_string(),
            name: "Simple Carousel".to_string(),
        }
    }
}

impl Default for SimpleCarousel {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualization for SimpleCarousel {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config_schema(&self) -> ConfigSchema {
        CarouselSettings::schema()
    }

    fn source_field(&self) -> &str {
        "query"
    }

    fn placeholder_message(&self) -> String {
        "Select a picture library in the web part properties to display the carousel.".to_string()
    }

    fn data_selection(&self, raw: &RawConfiguration, max_records: usize) -> Option<DataSelection> {
        let query = raw.text("query").and_then(QuerySpec::parse)?;
        Some(DataSelection::Remote(
            query
                .with_projection(PICTURE_PROJECTION, PICTURE_EXPAND)
                .capped(max_records),
        ))
    }

    fn dependencies(&self, cdn_base: &str) -> Vec<ResourceDescriptor> {
        let gallery = format!("{}/{}", cdn_base, UNITE_GALLERY);
        vec![
            ResourceDescriptor::stylesheet(format!("{}/css/unite-gallery.css", gallery)),
            ResourceDescriptor::stylesheet(format!(
                "{}/themes/default/ug-theme-default.css",
                gallery
            )),
            ResourceDescriptor::script(format!("{}/{}", cdn_base, JQUERY), "jQuery"),
            ResourceDescriptor::script(format!("{}/js/unitegallery.min.js", gallery), "jQuery"),
            ResourceDescriptor::script(
                format!("{}/themes/carousel/ug-theme-carousel.js", gallery),
                "jQuery",
            ),
        ]
    }

    fn map_records(&self, records: &[DataRecord]) -> SeriesData {
        map_records(records, SeriesKind::Gallery)
    }

    fn build_options(
        &self,
        resolved: &ResolvedConfiguration,
        series: &SeriesData,
    ) -> RenderOptions {
        let settings: CarouselSettings = typed_settings(self.id(), resolved);
        let items = match series {
            SeriesData::Gallery(items) => items.clone(),
            SeriesData::Chart(_) => Vec::new(),
        };

        RenderOptions::Carousel(CarouselOptions {
            gallery: settings.gallery_options(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    fn build(raw: &RawConfiguration, records: &[DataRecord]) -> CarouselOptions {
        let carousel = SimpleCarousel::new();
        let resolved = resolve(raw, &carousel.config_schema());
        match carousel.build_options(&resolved, &carousel.map_records(records)) {
            RenderOptions::Carousel(options) => options,
            other => panic!("unexpected options {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let options = build(&RawConfiguration::new(), &[]);
        let gallery = options.gallery;

        assert_eq!(gallery.gallery_theme, "carousel");
        assert!(gallery.theme_enable_navigation);
        assert_eq!(gallery.carousel_autoplay_timeout, 3000.0);
        assert_eq!(gallery.tile_width, 160.0);
        assert_eq!(gallery.tile_textpanel_bg_opacity, 0.4);
        assert_eq!(gallery.tile_textpanel_title_font_size, 14.0);
        assert_eq!(gallery.tile_textpanel_title_font_family, DEFAULT_CAROUSEL_FONT);
        assert_eq!(gallery.tile_border_color, "#F0F0F0");
        assert!(options.items.is_empty());
    }

    #[test]
    fn test_configured_values() {
        let raw = RawConfiguration::new()
            .with("speed", 5000)
            .with("textPanelFontSize", "20px")
            .with("textPanelAlign", "left")
            .with("enableBorder", false)
            .with("border", 99);
        let gallery = build(&raw, &[]).gallery;

        assert_eq!(gallery.carousel_autoplay_timeout, 5000.0);
        assert_eq!(gallery.tile_textpanel_title_font_size, 20.0);
        assert_eq!(gallery.tile_textpanel_title_text_align, "left");
        assert!(!gallery.tile_enable_border);
        // Outside the slider range
        assert_eq!(gallery.tile_border_width, 3.0);
    }

    #[test]
    fn test_slides_follow_records() {
        let records = vec![
            DataRecord::from_json(json!({
                "Title": "Sunset",
                "Description": "Evening",
                "File": {"Name": "a.jpg", "ServerRelativeUrl": "/pics/a.jpg"}
            }))
            .unwrap(),
            DataRecord::from_json(json!({
                "Title": "",
                "Description": "",
                "File": {"Name": "photo.jpg", "ServerRelativeUrl": "/pics/photo.jpg"}
            }))
            .unwrap(),
        ];
        let items = build(&RawConfiguration::new(), &records).items;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].caption, "Sunset");
        assert_eq!(items[1].caption, "photo.jpg");
        assert_eq!(items[1].image_url, "/pics/photo.jpg");
    }

    #[test]
    fn test_gallery_option_keys() {
        let value = serde_json::to_value(build(&RawConfiguration::new(), &[]).gallery).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("carousel_autoplay_pause_onhover"));
        assert!(object.contains_key("tile_textpanel_always_on"));
        assert_eq!(object.len(), 19);
    }

    #[test]
    fn test_query_required() {
        let carousel = SimpleCarousel::new();
        assert!(carousel.data_selection(&RawConfiguration::new(), 100).is_none());
        assert!(carousel
            .data_selection(&RawConfiguration::new().with("query", "  "), 100)
            .is_none());

        let raw = RawConfiguration::new()
            .with("query", "/_api/lists/GetByTitle('Pictures')/items?$top=500&");
        match carousel.data_selection(&raw, 100) {
            Some(DataSelection::Remote(query)) => {
                assert_eq!(query.collection, "Pictures");
                assert_eq!(query.limit, Some(100));
                assert_eq!(query.expand, vec!["File"]);
                assert!(query.request_url().contains("$expand=File"));
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_dependencies_in_load_order() {
        let deps = SimpleCarousel::new().dependencies("https://cdn.test");
        let files: Vec<&str> = deps.iter().map(|d| d.file_name()).collect();
        assert_eq!(
            files,
            vec![
                "unite-gallery.css",
                "ug-theme-default.css",
                "jquery.min.js",
                "unitegallery.min.js",
                "ug-theme-carousel.js"
            ]
        );
        assert_eq!(
            deps[3].url,
            "https://cdn.test/unitegallery/1.7.28/js/unitegallery.min.js"
        );
    }
}
