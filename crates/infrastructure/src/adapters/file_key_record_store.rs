//! JSON-file key record store
//!
//! The record is a small JSON document `{"key": "...", "expiry": "..."}`.
//! Writes go to a sibling temp file that is renamed over the target, so a
//! crash mid-write never leaves a truncated record behind.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use application::{error::ApplicationError, ports::KeyRecordStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use domain::AccessKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// On-disk shape of the key record
#[derive(Debug, Serialize, Deserialize)]
struct KeyRecord {
    #[serde(alias = "value")]
    key: String,
    expiry: String,
}

/// Key record persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct FileKeyRecordStore {
    path: PathBuf,
}

impl FileKeyRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Accept RFC 3339 timestamps, and offset-less ISO timestamps read as UTC
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, ApplicationError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ApplicationError::Persistence(format!("invalid expiry timestamp: {e}")))
}

#[async_trait]
impl KeyRecordStore for FileKeyRecordStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<AccessKey>, ApplicationError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No key record on disk");
                return Ok(None);
            },
            Err(e) => {
                return Err(ApplicationError::Persistence(format!(
                    "failed to read key record: {e}"
                )));
            },
        };

        let record: KeyRecord = serde_json::from_slice(&bytes)
            .map_err(|e| ApplicationError::Persistence(format!("malformed key record: {e}")))?;
        let expiry = parse_expiry(&record.expiry)?;
        let key = AccessKey::new(record.key, expiry)?;

        Ok(Some(key))
    }

    #[instrument(skip(self, key), fields(path = %self.path.display()))]
    async fn save(&self, key: &AccessKey) -> Result<(), ApplicationError> {
        let record = KeyRecord {
            key: key.value().to_string(),
            expiry: key.expiry().to_rfc3339_opts(SecondsFormat::AutoSi, true),
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ApplicationError::Persistence(format!("failed to create key directory: {e}"))
            })?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| ApplicationError::Persistence(format!("failed to write key record: {e}")))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ApplicationError::Persistence(format!("failed to replace key record: {e}"))
        })?;

        debug!("Key record written");
        Ok(())
    }
}
