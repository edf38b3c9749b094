//! REST dataset provider.
//!
//! Each document lives at `{base_url}/{school}/{document}.json`. A timestamp
//! query parameter defeats intermediate caches.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{Dataset, DatasetProvider};
use crate::error::{ConfigError, CoreError, Document, LoadError, Result};

const SCHEDULES_PATH: &str = "schedules";
const CALENDAR_PATH: &str = "calendars";
const SYMBOLS_PATH: &str = "symbols";
const ZERO_PERIOD_PATH: &str = "zeroPeriodSymbol";
const LAST_UPDATED_PATH: &str = "lastUpdated";

pub struct HttpDatasetProvider {
    client: Client,
    root: Url,
}

impl HttpDatasetProvider {
    /// # Errors
    /// Returns a configuration error when the base URL and school do not form a valid URL.
    pub fn new(base_url: &str, school: &str) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "dataset.base_url".into(),
                message: "no dataset URL configured".into(),
            }
            .into());
        }
        let root = format!(
            "{}/{}/",
            base_url.trim_end_matches('/'),
            school.trim_matches('/')
        );
        let root = Url::parse(&root).map_err(|e| ConfigError::InvalidValue {
            key: "dataset.base_url".into(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            root,
        })
    }

    fn document_url(&self, name: &str) -> Result<Url> {
        let mut url = self
            .root
            .join(&format!("{name}.json"))
            .map_err(|e| ConfigError::InvalidValue {
                key: "dataset.school".into(),
                message: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("ts", &Utc::now().timestamp().to_string());
        Ok(url)
    }

    async fn get_json(&self, document: Document, name: &str) -> Result<Value> {
        let url = self.document_url(name)?;
        debug!("fetching {document} from {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::missing(document, e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LoadError::missing(document, format!("HTTP {}", resp.status())).into());
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| LoadError::shape(document, e.to_string()))?;
        if value.is_null() {
            return Err(LoadError::missing(document, "document is empty").into());
        }
        Ok(value)
    }

    async fn get_object(&self, document: Document, name: &str) -> Result<Value> {
        let value = self.get_json(document, name).await?;
        if !value.is_object() {
            return Err(LoadError::shape(document, "expected an object").into());
        }
        Ok(value)
    }

    async fn fetch_zero_period_marker(&self) -> Result<String> {
        match self.get_json(Document::ZeroPeriodMarker, ZERO_PERIOD_PATH).await? {
            Value::String(marker) => Ok(marker),
            other => Err(LoadError::shape(
                Document::ZeroPeriodMarker,
                format!("expected a string, got {other}"),
            )
            .into()),
        }
    }
}

impl DatasetProvider for HttpDatasetProvider {
    async fn fetch_last_modified(&self) -> Result<DateTime<Utc>> {
        let value = self.get_json(Document::LastModified, LAST_UPDATED_PATH).await?;
        let secs = value.as_i64().ok_or_else(|| {
            LoadError::shape(
                Document::LastModified,
                format!("expected integer seconds, got {value}"),
            )
        })?;
        DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            LoadError::shape(Document::LastModified, format!("{secs} is out of range")).into()
        })
    }

    /// Fetches every document concurrently. All failures are logged; the
    /// first one is returned.
    async fn fetch_dataset(&self) -> Result<Dataset> {
        let (schedule_table, calendar, symbols, zero_period_marker, last_modified) = tokio::join!(
            self.get_object(Document::ScheduleTable, SCHEDULES_PATH),
            self.get_object(Document::Calendar, CALENDAR_PATH),
            self.get_object(Document::Symbols, SYMBOLS_PATH),
            self.fetch_zero_period_marker(),
            self.fetch_last_modified(),
        );

        let mut errors: Vec<CoreError> = Vec::new();
        let schedule_table = schedule_table.map_err(|e| errors.push(e)).ok();
        let calendar = calendar.map_err(|e| errors.push(e)).ok();
        let symbols = symbols.map_err(|e| errors.push(e)).ok();
        let zero_period_marker = zero_period_marker.map_err(|e| errors.push(e)).ok();
        let last_modified = last_modified.map_err(|e| errors.push(e)).ok();

        if let (
            Some(schedule_table),
            Some(calendar),
            Some(symbols),
            Some(zero_period_marker),
            Some(last_modified),
        ) = (schedule_table, calendar, symbols, zero_period_marker, last_modified)
        {
            return Ok(Dataset {
                schedule_table,
                calendar,
                symbols,
                zero_period_marker,
                last_modified,
            });
        }

        let mut errors = errors.into_iter();
        let first = errors
            .next()
            .unwrap_or_else(|| LoadError::missing(Document::Bundle, "incomplete dataset").into());
        for other in errors {
            warn!("dataset fetch: {other}");
        }
        Err(first)
    }
}
