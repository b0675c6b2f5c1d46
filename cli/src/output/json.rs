//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one object on stdout: the command
//! result on success, or the error object below on failure.

use anyhow::{Context, Result};

use crate::domain::{ConfigError, JobError, PackageError, RemoteError, SessionError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for an error chain.
///
/// The first typed domain error found in the chain decides the code;
/// anything else is `"error"`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return match e {
                SessionError::Authentication { .. } => "authentication_failed",
                SessionError::NotAuthenticated => "not_authenticated",
                SessionError::Timeout { .. } => "timeout",
            };
        }
        if let Some(e) = cause.downcast_ref::<RemoteError>() {
            return match e {
                RemoteError::Operation { .. } => "remote_operation_failed",
                RemoteError::InvalidResponse { .. } => "invalid_response",
                RemoteError::NoLiveTheme => "no_live_theme",
            };
        }
        if let Some(e) = cause.downcast_ref::<JobError>() {
            return match e {
                JobError::Failed { .. } => "job_failed",
                JobError::TimedOut { .. } => "job_timed_out",
            };
        }
        if let Some(e) = cause.downcast_ref::<PackageError>() {
            return match e {
                PackageError::InvalidSource(_) => "invalid_source",
                PackageError::Archive(_) => "archive_error",
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "invalid_config";
        }
    }
    "error"
}

/// Format a command result object.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_result(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}
