//! Record source backed by JSON documents on disk
//!
//! Accepts the shapes list REST endpoints return: `{"value": [...]}`
//! (nometadata), `{"d": {"results": [...]}}` (verbose) or a bare array.

use super::apply_query;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};
use vizpart_core::{RecordSource, SourceMetadata};
use vizpart_types::{DataRecord, QuerySpec};

pub struct JsonFileRecordSource {
    metadata: SourceMetadata,
    /// A single document, or a directory holding `<collection>.json` files
    root: PathBuf,
}

impl JsonFileRecordSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            metadata: SourceMetadata {
                id: "json_file".to_string(),
                name: "JSON file".to_string(),
                description: format!("Records read from {}", root.display()),
            },
            root,
        }
    }

    /// Document holding `collection`. Only plain file names resolve inside
    /// a directory root.
    async fn document_path(&self, collection: &str) -> Result<PathBuf> {
        let is_dir = tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Ok(self.root.clone());
        }

        let file_name = format!("{}.json", collection);
        let plain = !collection.is_empty()
            && !collection.contains(['/', '\\', '\0'])
            && collection != "."
            && collection != ".."
            && Path::new(&file_name).components().count() == 1;
        if !plain {
            bail!("Invalid collection name '{}'", collection);
        }
        Ok(self.root.join(file_name))
    }
}

/// Extract the rows of a list response document
pub fn parse_records(document: Value) -> Result<Vec<DataRecord>> {
    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(mut object) => {
            if let Some(Value::Array(rows)) = object.remove("value") {
                rows
            } else if let Some(Value::Array(rows)) = object
                .get_mut("d")
                .and_then(|d| d.get_mut("results"))
                .map(Value::take)
            {
                rows
            } else {
                bail!("Document has neither 'value' nor 'd.results' rows");
            }
        }
        _ => bail!("Document is not a list response"),
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| DataRecord::from_json(row).ok_or_else(|| anyhow!("Row {} is not an object", i)))
        .collect()
}

async fn read_document(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[async_trait]
impl RecordSource for JsonFileRecordSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<DataRecord>> {
        let path = self.document_path(&query.collection).await?;
        let records = parse_records(read_document(&path).await?)?;
        debug!("Read {} records from {}", records.len(), path.display());
        Ok(apply_query(records, query))
    }

    fn is_available(&self) -> bool {
        self.root.exists()
    }
}
