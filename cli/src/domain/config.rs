//! Domain types and validators for the `themer.json` record.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// File name looked up inside a theme directory and written by `themer down`.
pub const CONFIG_FILE_NAME: &str = "themer.json";

// ── Config schema ────────────────────────────────────────────────────────────

/// Connection settings for one Help Center, plus the local theme folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemerConfig {
    /// Help Center base URL, e.g. `https://acme.zendesk.com`.
    pub domain: String,
    /// Agent email used for the console login.
    pub email: String,
    /// Agent password used for the console login.
    pub password: String,
    /// Theme folder. Relative values are resolved against the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
}

impl ThemerConfig {
    /// Validate required fields and normalize the domain in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is empty or the domain is not a valid URL.
    pub fn validated(mut self) -> Result<Self> {
        if self.email.trim().is_empty() {
            return Err(ConfigError::MissingField("email").into());
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password").into());
        }
        self.domain = normalize_domain(&self.domain)?;
        Ok(self)
    }

    /// Host part of the domain, used as the default download folder name.
    #[must_use]
    pub fn host(&self) -> String {
        Url::parse(&self.domain)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| self.domain.clone())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Normalize a user-typed Help Center address into a base URL.
///
/// Adds `https://` when no scheme is given, lowercases the host, and drops a
/// trailing slash, path, query and fragment.
///
/// # Errors
///
/// Returns an error if the value is empty, uses a non-HTTP scheme, or has no host.
pub fn normalize_domain(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField("domain").into());
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let invalid = |reason: &str| ConfigError::InvalidDomain {
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https are supported").into());
    }
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    Ok(format!("{}://{}{port}", url.scheme(), host.to_ascii_lowercase()))
}

/// Resolve a config `target` relative to the directory holding the config file.
#[must_use]
pub fn resolve_target(config_dir: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        config_dir.join(target)
    }
}

/// Join a route onto a normalized domain.
///
/// # Errors
///
/// Returns an error if the domain is not a valid base URL.
pub fn route_url(domain: &str, route: &str) -> Result<String> {
    let base = Url::parse(domain).map_err(|e| ConfigError::InvalidDomain {
        value: domain.to_string(),
        reason: e.to_string(),
    })?;
    Ok(base.join(route)?.to_string())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
