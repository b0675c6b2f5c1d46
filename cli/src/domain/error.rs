//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Session errors ────────────────────────────────────────────────────────────

/// Errors raised while establishing or using the authenticated browser session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The authentication cookie never appeared after submitting the login form.
    #[error("Login failed for {domain}: the authentication cookie was not set.")]
    Authentication { domain: String },

    #[error("Session is not authenticated. Log in before talking to the theme console.")]
    NotAuthenticated,

    /// A navigation or selector wait did not settle in time.
    #[error("Timed out after {secs}s waiting for {what}.")]
    Timeout { what: String, secs: u64 },
}

// ── Remote console errors ─────────────────────────────────────────────────────

/// Errors reported by the remote theme console.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The injected console call rejected.
    #[error("Remote operation '{operation}' failed: {message}")]
    Operation { operation: String, message: String },

    /// The console answered with something that does not match the operation's contract.
    #[error("Remote operation '{operation}' returned an unexpected response: {detail}")]
    InvalidResponse { operation: String, detail: String },

    #[error("No live theme found. The account reports no theme as live.")]
    NoLiveTheme,
}

// ── Job errors ────────────────────────────────────────────────────────────────

/// Errors ending a job wait.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {job_id} failed: {message}")]
    Failed { job_id: String, message: String },

    /// The caller's deadline expired. The remote job keeps running.
    #[error("Gave up waiting for job {job_id} after {secs}s (the remote job was not cancelled).")]
    TimedOut { job_id: String, secs: u64 },
}

// ── Packaging errors ──────────────────────────────────────────────────────────

/// Errors related to packing or unpacking theme archives.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Invalid theme source '{}': not an existing directory.", .0.display())]
    InvalidSource(PathBuf),

    #[error("Theme archive error: {0}")]
    Archive(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the `themer.json` record.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid domain '{value}': {reason}")]
    InvalidDomain { value: String, reason: String },
}
