//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    Cookie, Job, JobStatus, ThemeInfo, ThemerConfig, UploadFields, UploadPayload, UploadReceipt,
};

// ── Browser Ports ─────────────────────────────────────────────────────────────

/// One open page (tab) in the shared browsing context.
///
/// Operations against one page run in the order they are awaited.
#[allow(async_fn_in_trait)]
pub trait BrowserPage {
    /// Navigate to `url` and wait until the load settles.
    async fn goto(&self, url: &str) -> Result<()>;
    /// Evaluate a script expression, awaiting a returned promise, and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// Evaluate a script that triggers a navigation and wait for that navigation to settle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Timeout` if the navigation does not settle within `timeout`.
    async fn evaluate_and_wait_for_navigation(&self, script: &str, timeout: Duration) -> Result<()>;
    /// Wait until `selector` matches an element in the page.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Timeout` if no element matches within `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    /// Cookies visible to the page's current URL.
    async fn cookies(&self) -> Result<Vec<Cookie>>;
    /// Close the page. Every opened page must be closed exactly once.
    async fn close(self) -> Result<()>;
}

/// The single authenticated browsing context shared by all operations.
#[allow(async_fn_in_trait)]
pub trait BrowserContext {
    type Page: BrowserPage;

    /// Open a new blank page in this context.
    async fn new_page(&self) -> Result<Self::Page>;
    /// Close the context and every page still open in it.
    async fn close(self) -> Result<()>;
}

// ── Theme Console Ports ───────────────────────────────────────────────────────

/// Typed remote operations available on an open console page.
#[allow(async_fn_in_trait)]
pub trait ThemeConsole {
    /// List every theme of the account.
    async fn list_themes(&self) -> Result<Vec<ThemeInfo>>;
    /// Start exporting `theme_id`.
    async fn create_export_job(&self, theme_id: &str) -> Result<Job>;
    /// Reserve a new theme id and obtain presigned upload parameters.
    async fn create_import_job(&self) -> Result<Job>;
    /// Read the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatus>;
    /// Make `theme_id` the live theme.
    async fn publish_theme(&self, theme_id: &str) -> Result<()>;
    /// Archive (delete) `theme_id`.
    async fn archive_theme(&self, theme_id: &str) -> Result<()>;
    /// Close the underlying page.
    async fn close(self) -> Result<()>;
}

/// Opens console pages and plain pages against the authenticated session.
#[allow(async_fn_in_trait)]
pub trait Workbench {
    type Console: ThemeConsole;

    /// Open a console page. The caller owns it and must close it on every path.
    async fn open_console(&self) -> Result<Self::Console>;
    /// Visit `url` in a throwaway page of the authenticated context.
    async fn visit(&self, url: &str) -> Result<()>;
}

// ── Transfer Ports ────────────────────────────────────────────────────────────

/// Packs a theme directory into an uploadable archive.
#[allow(async_fn_in_trait)]
pub trait ThemePackager {
    /// Pack every file below `source`, keeping relative paths.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidSource` if `source` is not an existing directory.
    async fn pack(&self, source: &Path) -> Result<UploadPayload>;
}

/// Sends a payload to a presigned storage endpoint.
#[allow(async_fn_in_trait)]
pub trait BlobUploader {
    /// Submit `fields` then `payload` as a multipart form.
    async fn upload(
        &self,
        payload: UploadPayload,
        url: &str,
        fields: &UploadFields,
    ) -> Result<UploadReceipt>;
}

/// Fetches an exported archive and unpacks it.
#[allow(async_fn_in_trait)]
pub trait ThemeDownloader {
    /// Download `url` and extract it into `dest`, returning `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf>;
}

// ── Time Port ─────────────────────────────────────────────────────────────────

/// Suspends the caller; injected so polling can be tested without real waits.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads and saves `themer.json` records.
pub trait ConfigStore {
    /// Load a record, resolving a relative `target` against the file's directory.
    fn load(&self, path: &Path) -> Result<ThemerConfig>;
    /// Write a record, creating parent directories as needed.
    fn save(&self, path: &Path, config: &ThemerConfig) -> Result<()>;
}
