//! The fixed set of operations the theme console exposes.
//!
//! Commands are rendered into a call on the injected helper object and the
//! reply envelope is checked here before any caller sees the value.

use anyhow::Result;
use serde_json::{Value, json};

use crate::domain::error::RemoteError;

/// Global installed by the console helper script.
pub const HELPER_GLOBAL: &str = "__themer";

/// Helper script evaluated in every console page; installs [`HELPER_GLOBAL`].
pub const HELPER_SCRIPT: &str = include_str!("../../assets/console-helpers.js");

/// One remote operation with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    ListThemes,
    CreateExportThemeJob { theme_id: String },
    CreateImportThemeJob,
    GetJobStatus { job_id: String },
    PublishTheme { theme_id: String },
    ArchiveTheme { theme_id: String },
}

impl RemoteCommand {
    /// Operation name as registered by the helper script.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListThemes => "listThemes",
            Self::CreateExportThemeJob { .. } => "createExportThemeJob",
            Self::CreateImportThemeJob => "createImportThemeJob",
            Self::GetJobStatus { .. } => "getJobStatus",
            Self::PublishTheme { .. } => "publishTheme",
            Self::ArchiveTheme { .. } => "archiveTheme",
        }
    }

    #[must_use]
    pub fn args(&self) -> Value {
        match self {
            Self::ListThemes | Self::CreateImportThemeJob => json!({}),
            Self::CreateExportThemeJob { theme_id }
            | Self::PublishTheme { theme_id }
            | Self::ArchiveTheme { theme_id } => json!({ "themeId": theme_id }),
            Self::GetJobStatus { job_id } => json!({ "jobId": job_id }),
        }
    }

    /// Script expression evaluated in the console page.
    ///
    /// The expression always resolves: rejections are folded into an
    /// `{ "error": message }` envelope so the message survives the bridge.
    #[must_use]
    pub fn to_script(&self) -> String {
        let name = Value::String(self.name().to_string());
        format!(
            "(window.{HELPER_GLOBAL} ? window.{HELPER_GLOBAL}.invoke({name}, {args}) \
             : Promise.reject(new Error('console helper not installed')))\
             .then(value => ({{ ok: value === undefined ? null : value }}), \
             error => ({{ error: String((error && error.message) || error) }}))",
            args = self.args(),
        )
    }

    /// Unwrap the reply envelope produced by [`Self::to_script`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Operation`] when the call rejected and
    /// [`RemoteError::InvalidResponse`] when the reply is not an envelope.
    pub fn parse_reply(&self, reply: Value) -> Result<Value> {
        let Value::Object(mut envelope) = reply else {
            return Err(self.invalid(format!("expected a reply envelope, got {reply}")).into());
        };
        if let Some(message) = envelope.remove("error") {
            let message = match message {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(RemoteError::Operation {
                operation: self.name().to_string(),
                message,
            }
            .into());
        }
        envelope
            .remove("ok")
            .ok_or_else(|| self.invalid("reply envelope has neither 'ok' nor 'error'".to_string()).into())
    }

    /// Build an [`RemoteError::InvalidResponse`] for this operation.
    #[must_use]
    pub fn invalid(&self, detail: String) -> RemoteError {
        RemoteError::InvalidResponse {
            operation: self.name().to_string(),
            detail,
        }
    }
}
