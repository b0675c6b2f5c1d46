//! Remote export/import jobs.
//!
//! A job is created remotely and only ever observed: its status is re-read
//! from the console on every poll and never advanced locally.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::domain::error::RemoteError;

/// Remote status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    /// Map the console's status string. Anything not terminal is still pending.
    #[must_use]
    pub fn from_remote(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Server-issued form fields for the presigned upload, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadFields(Vec<(String, String)>);

impl UploadFields {
    #[must_use]
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self(fields)
    }

    /// Parse the JSON object the console hands out as `upload_params`.
    ///
    /// Key order is kept. String values pass through untouched; other scalars
    /// are rendered as their JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object or holds nested values.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |detail: String| RemoteError::InvalidResponse {
            operation: "createImportThemeJob".to_string(),
            detail,
        };
        let map: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| invalid(format!("upload params are not a JSON object: {e}")))?;
        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(invalid(format!("upload param '{key}' is not a scalar")).into());
                }
            };
            fields.push((key, text));
        }
        Ok(Self(fields))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a job produces once it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Export of an existing theme; the archive becomes downloadable at `download_url`.
    Export { download_url: String },
    /// Import into a freshly reserved theme id; the payload goes to `upload_url`.
    Import {
        theme_id: String,
        upload_url: String,
        upload_fields: UploadFields,
    },
}

/// A remote job as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub kind: JobKind,
    pub status: JobStatus,
}

impl Job {
    #[must_use]
    pub fn export(id: String, download_url: String) -> Self {
        Self {
            id,
            kind: JobKind::Export { download_url },
            status: JobStatus::Pending,
        }
    }

    #[must_use]
    pub fn import(id: String, theme_id: String, upload_url: String, upload_fields: UploadFields) -> Self {
        Self {
            id,
            kind: JobKind::Import {
                theme_id,
                upload_url,
                upload_fields,
            },
            status: JobStatus::Pending,
        }
    }

    /// Copy of this job carrying a status read from the remote.
    #[must_use]
    pub fn observed(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Theme id reserved by an import job.
    #[must_use]
    pub fn theme_id(&self) -> Option<&str> {
        match &self.kind {
            JobKind::Import { theme_id, .. } => Some(theme_id),
            JobKind::Export { .. } => None,
        }
    }

    /// Download URL of an export job.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        match &self.kind {
            JobKind::Export { download_url } => Some(download_url),
            JobKind::Import { .. } => None,
        }
    }
}
