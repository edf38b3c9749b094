//! Dataset acquisition: remote/file providers and the cache-aware loader.

mod http;
mod loader;

pub use http::HttpDatasetProvider;
pub use loader::{load_newest_context, LoadOutcome};

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Document, LoadError, Result};

/// One version of the authoritative dataset, as raw documents.
///
/// Field names follow the remote layout so a whole bundle can be stored as a
/// single JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "schedules")]
    pub schedule_table: Value,
    #[serde(rename = "calendars")]
    pub calendar: Value,
    pub symbols: Value,
    #[serde(rename = "zeroPeriodSymbol", default)]
    pub zero_period_marker: String,
    #[serde(rename = "lastUpdated", with = "chrono::serde::ts_seconds")]
    pub last_modified: DateTime<Utc>,
}

/// Source of the authoritative dataset.
///
/// The two operations are independent so a caller can check staleness before
/// paying for a full fetch.
pub trait DatasetProvider {
    fn fetch_last_modified(&self) -> impl Future<Output = Result<DateTime<Utc>>> + Send;

    fn fetch_dataset(&self) -> impl Future<Output = Result<Dataset>> + Send;
}

/// Reads a dataset bundle from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileDatasetProvider {
    path: PathBuf,
}

impl FileDatasetProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Dataset> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            LoadError::missing(Document::Bundle, format!("{}: {e}", self.path.display()))
        })?;
        let dataset = serde_json::from_str(&content).map_err(|e| {
            LoadError::shape(Document::Bundle, format!("{}: {e}", self.path.display()))
        })?;
        Ok(dataset)
    }
}

impl DatasetProvider for FileDatasetProvider {
    async fn fetch_last_modified(&self) -> Result<DateTime<Utc>> {
        Ok(self.read()?.last_modified)
    }

    async fn fetch_dataset(&self) -> Result<Dataset> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_provider_reads_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(
            &path,
            r#"{
                "schedules": {},
                "calendars": {},
                "symbols": {},
                "zeroPeriodSymbol": "$(per0)",
                "lastUpdated": 1700000000
            }"#,
        )
        .unwrap();

        let provider = FileDatasetProvider::new(&path);
        let modified = provider.fetch_last_modified().await.unwrap();
        assert_eq!(modified.timestamp(), 1_700_000_000);
        let dataset = provider.fetch_dataset().await.unwrap();
        assert_eq!(dataset.zero_period_marker, "$(per0)");
    }

    #[tokio::test]
    async fn file_provider_reports_missing_file() {
        let provider = FileDatasetProvider::new("/nonexistent/dataset.json");
        let err = provider.fetch_dataset().await.unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Load(LoadError::MissingData { .. })
        ));
    }
}
