pub mod errors;

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use crate::initialization::Annotations;
use crate::manager_annotations::errors::AppendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentKind {
    Inverter,
    SubUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Good,
    Bad,
}

/// One user-submitted "reason" row tied to an equipment unit and date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub plant_id: String,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: String,
    pub verdict: Verdict,
    pub detail: String,
    pub date: NaiveDate,
}

/// Append-only store for annotation records, selected by configuration.
/// Each append is all-or-nothing and never retried here; the caller decides
/// what to do with a failure.
pub enum AnnotationStore {
    Local(LocalSheet),
    Remote(RemoteSheet),
    Unconfigured(String),
}

impl AnnotationStore {
    /// Builds the store matching the configuration. Missing or unknown
    /// settings produce an unconfigured store whose appends fail with
    /// AppendError::NotConfigured rather than preventing startup
    ///
    /// # Arguments
    ///
    /// * 'config' - annotations configuration section
    pub fn from_config(config: &Annotations) -> Self {
        match config.backend.as_str() {
            "local" => match &config.sheet_path {
                Some(path) => AnnotationStore::Local(LocalSheet::new(path)),
                None => AnnotationStore::Unconfigured("local backend without sheet_path".to_string()),
            },
            "remote" => match (&config.endpoint, &config.token) {
                (Some(endpoint), Some(token)) => match RemoteSheet::new(endpoint, token) {
                    Ok(sheet) => AnnotationStore::Remote(sheet),
                    Err(e) => AnnotationStore::Unconfigured(e.to_string()),
                },
                _ => AnnotationStore::Unconfigured("remote backend without endpoint/token".to_string()),
            },
            other => AnnotationStore::Unconfigured(format!("unknown backend '{}'", other)),
        }
    }

    /// Appends one record to the configured sheet
    ///
    /// # Arguments
    ///
    /// * 'record' - the annotation to append
    pub async fn append(&self, record: &AnnotationRecord) -> Result<(), AppendError> {
        match self {
            AnnotationStore::Local(sheet) => sheet.append(record),
            AnnotationStore::Remote(sheet) => sheet.append(record).await,
            AnnotationStore::Unconfigured(reason) => {
                Err(AppendError::NotConfigured(reason.clone()))
            }
        }
    }
}

/// Local CSV sheet with append-or-create semantics
pub struct LocalSheet {
    path: PathBuf,
}

impl LocalSheet {
    pub fn new(path: &str) -> Self {
        Self { path: PathBuf::from(path) }
    }

    /// Appends one row, creating the file (and its directory) with a header
    /// row on first use. The row is serialized fully in memory before the
    /// file is touched so a serialization problem never leaves a partial line
    ///
    /// # Arguments
    ///
    /// * 'record' - the annotation to append
    pub fn append(&self, record: &AnnotationRecord) -> Result<(), AppendError> {
        let has_rows = fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!has_rows)
            .from_writer(Vec::new());
        writer.serialize(record)?;
        let row = writer.into_inner()
            .map_err(|e| AppendError::IoFailure(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&row)?;

        Ok(())
    }
}

/// Remote sheet service reached over HTTP, one POST per appended row
pub struct RemoteSheet {
    client: Client,
    endpoint: String,
    token: String,
}

impl RemoteSheet {
    /// Returns a new instance of the RemoteSheet client
    ///
    /// # Arguments
    ///
    /// * 'endpoint' - URL rows are posted to
    /// * 'token' - bearer token for the sheet service
    pub fn new(endpoint: &str, token: &str) -> Result<Self, AppendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, endpoint: endpoint.to_string(), token: token.to_string() })
    }

    /// Posts one record as a json row
    ///
    /// # Arguments
    ///
    /// * 'record' - the annotation to append
    pub async fn append(&self, record: &AnnotationRecord) -> Result<(), AppendError> {
        let response = self.client.post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(record)
            .send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppendError::RemoteRejected(format!("{:?}", status)));
        }

        Ok(())
    }
}
