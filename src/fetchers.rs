//! Resource fetchers
//!
//! [`PreloadedFetcher`] treats every resource as already present on the
//! page. [`AssetDirFetcher`] serves resources from a local mirror of the CDN,
//! resolving each URL by its file name.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, trace};
use std::path::PathBuf;
use vizpart_core::{ResourceFetcher, ResourceHandle};
use vizpart_types::ResourceDescriptor;

#[derive(Debug, Default, Clone)]
pub struct PreloadedFetcher;

#[async_trait]
impl ResourceFetcher for PreloadedFetcher {
    async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle> {
        trace!("Assuming {} is preloaded", descriptor.url);
        Ok(ResourceHandle::new(descriptor.clone(), None))
    }
}

#[derive(Debug, Clone)]
pub struct AssetDirFetcher {
    root: PathBuf,
}

impl AssetDirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, descriptor: &ResourceDescriptor) -> Result<PathBuf> {
        let name = descriptor.file_name();
        if name.is_empty() || name == "." || name == ".." {
            bail!("Cannot derive a file name from {}", descriptor.url);
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ResourceFetcher for AssetDirFetcher {
    async fn load(&self, descriptor: &ResourceDescriptor) -> Result<ResourceHandle> {
        let path = self.resolve(descriptor)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("Failed to load {} from {}", descriptor.url, path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a file", path.display());
        }

        debug!("Loaded {} ({} bytes)", descriptor.url, metadata.len());
        Ok(ResourceHandle::new(descriptor.clone(), Some(metadata.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_asset_dir_resolves_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Chart.min.js"), "window.Chart = {};").unwrap();
        let fetcher = AssetDirFetcher::new(dir.path());

        let chart = ResourceDescriptor::script("https://cdn.test/Chart.js/2.3.0/Chart.min.js", "Chart");
        let handle = fetcher.load(&chart).await.unwrap();
        assert_eq!(handle.bytes, Some(18));

        let missing = ResourceDescriptor::script("https://cdn.test/jquery.min.js", "jQuery");
        assert!(fetcher.load(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_preloaded_always_succeeds() {
        let css = ResourceDescriptor::stylesheet("https://cdn.test/a.css");
        let handle = PreloadedFetcher.load(&css).await.unwrap();
        assert_eq!(handle.descriptor, css);
        assert_eq!(handle.bytes, None);
    }
}
