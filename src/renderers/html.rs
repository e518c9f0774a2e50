//! HTML renderer
//!
//! Emits the markup a browser page would hold after construction: the mount
//! element plus the library initialisation call.

use super::PageBuffer;
use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use vizpart_core::{MountPoint, RenderHandle, Renderer};
use vizpart_types::{CarouselOptions, PieChartOptions, RenderOptions};

pub struct HtmlRenderer {
    page: PageBuffer,
    constructions: AtomicU64,
}

impl HtmlRenderer {
    pub fn new(page: PageBuffer) -> Self {
        Self {
            page,
            constructions: AtomicU64::new(0),
        }
    }

    pub fn page(&self) -> &PageBuffer {
        &self.page
    }

    /// Number of constructions so far
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::SeqCst)
    }

    fn pie_chart_markup(mount: &MountPoint, options: &PieChartOptions) -> Result<String> {
        let id = escape(mount.id());
        Ok(format!(
            "<canvas id=\"{id}\" width=\"{}\" height=\"{}\"></canvas>\n\
             <script>new Chart(document.getElementById(\"{id}\"), {});</script>\n",
            options.canvas.width,
            options.canvas.height,
            script_json(&options.chart_config()?)?,
        ))
    }

    fn carousel_markup(mount: &MountPoint, options: &CarouselOptions) -> Result<String> {
        let gallery_id = escape(&mount.gallery_element_id());
        let mut html = format!("<div id=\"{}\" style=\"display:none;\">\n", gallery_id);
        for item in &options.items {
            let caption = escape(&item.caption);
            let url = escape(&item.image_url);
            writeln!(
                html,
                "  <img alt=\"{caption}\" src=\"{url}\" data-image=\"{url}\" data-description=\"{caption}\">"
            )?;
        }
        html.push_str("</div>\n");
        writeln!(
            html,
            "<script>jQuery(\"#{}\").unitegallery({});</script>",
            gallery_id,
            script_json(&options.gallery)?
        )?;
        Ok(html)
    }
}

impl Renderer for HtmlRenderer {
    fn id(&self) -> &str {
        "html"
    }

    fn construct(&self, mount: &MountPoint, options: &RenderOptions) -> Result<RenderHandle> {
        let markup = match options {
            RenderOptions::PieChart(pie) => Self::pie_chart_markup(mount, pie)?,
            RenderOptions::Carousel(carousel) => Self::carousel_markup(mount, carousel)?,
        };
        self.page.set_body(mount, markup);

        let sequence = self.constructions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("html: constructed {} on {} (#{})", options.kind(), mount, sequence);
        Ok(RenderHandle {
            renderer: self.id().to_string(),
            mount: mount.clone(),
            sequence,
        })
    }

    fn show_placeholder(&self, mount: &MountPoint, message: &str) -> Result<()> {
        self.page.set_body(mount, message_bar("Info", message));
        Ok(())
    }

    fn show_message(&self, mount: &MountPoint, message: &str) -> Result<()> {
        self.page.set_message(mount, message_bar("Warning", message));
        Ok(())
    }
}

fn message_bar(icon: &str, message: &str) -> String {
    format!(
        "<div class=\"ms-MessageBar\">\n\
         \x20 <div class=\"ms-MessageBar-content\">\n\
         \x20   <div class=\"ms-MessageBar-icon\"><i class=\"ms-Icon ms-Icon--{}\"></i></div>\n\
         \x20   <div class=\"ms-MessageBar-text\">{}</div>\n\
         \x20 </div>\n\
         </div>\n",
        icon,
        escape(message)
    )
}

/// Escape text for use in element content and quoted attributes
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON literal safe to embed in a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizpart_types::{
        AnimationOptions, CanvasSize, ChartDataset, GalleryItem, LegendLabelOptions,
        LegendOptions, PieChartBehavior, PieChartData, TitleOptions, UniteGalleryOptions,
    };

    fn pie() -> RenderOptions {
        RenderOptions::PieChart(PieChartOptions {
            canvas: CanvasSize {
                width: 300.0,
                height: 200.0,
            },
            chart_type: "pie".to_string(),
            data: PieChartData {
                labels: vec!["</script>".to_string()],
                datasets: vec![ChartDataset {
                    data: vec![Some(1.0)],
                    background_color: vec!["#fff".to_string()],
                    hover_background_color: vec!["#eee".to_string()],
                }],
            },
            options: PieChartBehavior {
                responsive: false,
                cutout_percentage: 0.0,
                animation: AnimationOptions {
                    animate_rotate: true,
                    animate_scale: false,
                },
                title: TitleOptions {
                    display: false,
                    text: String::new(),
                    position: "top".to_string(),
                    font_family: "Arial".to_string(),
                    font_size: 12.0,
                    font_color: "#666".to_string(),
                },
                legend: LegendOptions {
                    display: false,
                    position: "top".to_string(),
                    labels: LegendLabelOptions {
                        font_color: "#666".to_string(),
                        font_family: "Arial".to_string(),
                        font_size: 12.0,
                    },
                },
            },
        })
    }

    fn carousel(items: Vec<GalleryItem>) -> RenderOptions {
        RenderOptions::Carousel(CarouselOptions {
            gallery: UniteGalleryOptions {
                gallery_theme: "carousel".to_string(),
                theme_enable_navigation: true,
                carousel_autoplay: true,
                carousel_autoplay_timeout: 3000.0,
                carousel_autoplay_pause_onhover: true,
                tile_enable_icons: true,
                tile_width: 160.0,
                tile_height: 160.0,
                tile_enable_border: true,
                tile_border_width: 3.0,
                tile_border_color: "#F0F0F0".to_string(),
                tile_enable_textpanel: true,
                tile_textpanel_always_on: false,
                tile_textpanel_bg_color: "#000000".to_string(),
                tile_textpanel_bg_opacity: 0.4,
                tile_textpanel_title_color: "#ffffff".to_string(),
                tile_textpanel_title_font_family: "Arial".to_string(),
                tile_textpanel_title_text_align: "center".to_string(),
                tile_textpanel_title_font_size: 14.0,
            },
            items,
        })
    }

    #[test]
    fn test_pie_chart_markup() {
        let renderer = HtmlRenderer::new(PageBuffer::new());
        let mount = MountPoint::from_id("abc");

        let handle = renderer.construct(&mount, &pie()).unwrap();
        assert_eq!(handle.sequence, 1);

        let body = renderer.page().body(&mount).unwrap();
        assert!(body.starts_with("<canvas id=\"abc\" width=\"300\" height=\"200\">"));
        assert!(body.contains("new Chart(document.getElementById(\"abc\")"));
        assert!(body.contains("<\\/script>"));
        assert_eq!(body.matches("</script>").count(), 1);
    }

    #[test]
    fn test_carousel_markup_escapes_captions() {
        let renderer = HtmlRenderer::new(PageBuffer::new());
        let mount = MountPoint::from_id("g1");
        let items = vec![GalleryItem {
            caption: "Tom & \"Jerry\"".to_string(),
            image_url: "/pics/a.jpg".to_string(),
        }];

        renderer.construct(&mount, &carousel(items)).unwrap();
        let body = renderer.page().body(&mount).unwrap();

        assert!(body.contains("<div id=\"g1-gallery\" style=\"display:none;\">"));
        assert!(body.contains("alt=\"Tom &amp; &quot;Jerry&quot;\""));
        assert!(body.contains("data-image=\"/pics/a.jpg\""));
        assert!(body.contains("jQuery(\"#g1-gallery\").unitegallery({"));
        assert!(body.contains("\"gallery_theme\":\"carousel\""));
    }

    #[test]
    fn test_each_construct_replaces_body() {
        let renderer = HtmlRenderer::new(PageBuffer::new());
        let mount = MountPoint::from_id("m");

        renderer.show_placeholder(&mount, "Select a list").unwrap();
        assert!(renderer.page().body(&mount).unwrap().contains("ms-MessageBar"));

        renderer.construct(&mount, &carousel(vec![])).unwrap();
        let second = renderer.construct(&mount, &carousel(vec![])).unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(renderer.constructions(), 2);
        assert!(!renderer.page().body(&mount).unwrap().contains("ms-MessageBar"));
    }
}
