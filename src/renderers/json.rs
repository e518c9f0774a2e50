//! JSON renderer: records the option document each construction received

use super::PageBuffer;
use anyhow::Result;
use log::debug;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use vizpart_core::{MountPoint, RenderHandle, Renderer};
use vizpart_types::RenderOptions;

pub struct JsonRenderer {
    page: PageBuffer,
    constructions: AtomicU64,
}

impl JsonRenderer {
    pub fn new(page: PageBuffer) -> Self {
        Self {
            page,
            constructions: AtomicU64::new(0),
        }
    }

    pub fn page(&self) -> &PageBuffer {
        &self.page
    }

    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl Renderer for JsonRenderer {
    fn id(&self) -> &str {
        "json"
    }

    fn construct(&self, mount: &MountPoint, options: &RenderOptions) -> Result<RenderHandle> {
        let document = json!({
            "mount": mount.id(),
            "options": options,
        });
        self.page
            .set_body(mount, serde_json::to_string_pretty(&document)?);

        let sequence = self.constructions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("json: constructed {} on {} (#{})", options.kind(), mount, sequence);
        Ok(RenderHandle {
            renderer: self.id().to_string(),
            mount: mount.clone(),
            sequence,
        })
    }

    fn show_placeholder(&self, mount: &MountPoint, message: &str) -> Result<()> {
        let document = json!({ "mount": mount.id(), "placeholder": message });
        self.page
            .set_body(mount, serde_json::to_string_pretty(&document)?);
        Ok(())
    }

    fn show_message(&self, mount: &MountPoint, message: &str) -> Result<()> {
        self.page.set_message(mount, message.to_string());
        Ok(())
    }
}
