//! Application service — theme upload, download, and the live-theme swap.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every remote step opens its own console page and closes it on every exit
//! path. A swap that fails midway is left where it stopped; nothing is
//! rolled back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{
    BlobUploader, Clock, ProgressReporter, ThemeConsole, ThemeDownloader, ThemePackager, Workbench,
};
use crate::application::services::console::release;
use crate::application::services::jobs::{
    await_completion_within, create_export_job, create_import_job,
};
use crate::domain::{JobKind, RemoteError, SwapPlan, ThemeInfo, UploadPayload, live_theme_id};

/// Theme operations against one authenticated workbench.
pub struct ThemeTransfer<'a, W: Workbench, C: Clock, R: ProgressReporter> {
    workbench: &'a W,
    clock: &'a C,
    reporter: &'a R,
    /// Optional client-side deadline for each job wait.
    poll_timeout: Option<Duration>,
}

impl<'a, W: Workbench, C: Clock, R: ProgressReporter> ThemeTransfer<'a, W, C, R> {
    #[must_use]
    pub fn new(workbench: &'a W, clock: &'a C, reporter: &'a R) -> Self {
        Self {
            workbench,
            clock,
            reporter,
            poll_timeout: None,
        }
    }

    #[must_use]
    pub fn with_poll_timeout(mut self, limit: Option<Duration>) -> Self {
        self.poll_timeout = limit;
        self
    }

    /// List every theme of the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the console page cannot be opened or the call fails.
    pub async fn themes(&self) -> Result<Vec<ThemeInfo>> {
        let console = self.workbench.open_console().await?;
        let outcome = console.list_themes().await;
        release(console, outcome).await
    }

    /// Id of the theme currently live.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NoLiveTheme` when the account has no live theme.
    pub async fn live_theme_id(&self) -> Result<String> {
        let themes = self.themes().await?;
        live_theme_id(&themes).map(str::to_owned)
    }

    /// Publish `theme_id` as the live theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the console rejects the publish.
    pub async fn set_live_theme(&self, theme_id: &str) -> Result<()> {
        let console = self.workbench.open_console().await?;
        let outcome = console.publish_theme(theme_id).await;
        release(console, outcome).await
    }

    /// Archive `theme_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the console rejects the archive.
    pub async fn delete_theme(&self, theme_id: &str) -> Result<()> {
        let console = self.workbench.open_console().await?;
        let outcome = console.archive_theme(theme_id).await;
        release(console, outcome).await
    }

    /// Import `payload` as a new theme and return its id.
    ///
    /// Creates an import job, uploads the payload with the job's presigned
    /// fields, visits the tracking URL so the remote notices the upload, and
    /// waits for the job to complete.
    ///
    /// # Errors
    ///
    /// Returns an error if any of those steps fails.
    pub async fn upload_theme(
        &self,
        uploader: &impl BlobUploader,
        payload: UploadPayload,
    ) -> Result<String> {
        let console = self.workbench.open_console().await?;
        let outcome = self.import_on(&console, uploader, payload).await;
        release(console, outcome).await
    }

    async fn import_on(
        &self,
        console: &W::Console,
        uploader: &impl BlobUploader,
        payload: UploadPayload,
    ) -> Result<String> {
        let job = create_import_job(console).await?;
        let JobKind::Import {
            theme_id,
            upload_url,
            upload_fields,
        } = job.kind.clone()
        else {
            return Err(RemoteError::InvalidResponse {
                operation: "createImportThemeJob".to_string(),
                detail: "expected an import job".to_string(),
            }
            .into());
        };

        self.reporter
            .step(&format!("uploading {} bytes...", payload.size()));
        let receipt = uploader
            .upload(payload, &upload_url, &upload_fields)
            .await
            .context("uploading theme archive")?;
        if !receipt.accepted() {
            self.reporter.warn(&format!(
                "upload endpoint answered HTTP {}, confirming anyway",
                receipt.status
            ));
        }
        self.workbench
            .visit(&receipt.tracking_url)
            .await
            .context("confirming upload")?;

        self.reporter.step("waiting for import to finish...");
        await_completion_within(console, self.clock, job, self.poll_timeout)
            .await
            .context("waiting for import job")?;
        self.reporter.success(&format!("imported theme {theme_id}"));
        Ok(theme_id)
    }

    /// Pack `source`, import it, and make it the live theme.
    ///
    /// Without `persist`, the previously live theme id is read before the new
    /// theme is published and archived afterwards. With `persist`, the old
    /// theme is left alone. If publishing fails, the imported theme stays
    /// behind unpublished.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidSource` before any remote call when
    /// `source` is not a directory, or the error of the step that failed.
    pub async fn update_live_theme(
        &self,
        packager: &impl ThemePackager,
        uploader: &impl BlobUploader,
        source: &Path,
        persist: bool,
    ) -> Result<String> {
        self.reporter
            .step(&format!("packing {}...", source.display()));
        let payload = packager.pack(source).await?;

        let new_theme_id = self.upload_theme(uploader, payload).await?;
        info!(theme_id = %new_theme_id, "theme imported");

        let plan = if persist {
            SwapPlan::persisting(new_theme_id)
        } else {
            let previous = self
                .live_theme_id()
                .await
                .context("reading current live theme")?;
            SwapPlan::replacing(new_theme_id, previous)
        };

        self.reporter.step("publishing theme...");
        self.set_live_theme(&plan.new_theme_id)
            .await
            .with_context(|| format!("publishing theme {}", plan.new_theme_id))?;
        info!(theme_id = %plan.new_theme_id, "theme published");

        if let Some(previous) = plan.theme_to_archive() {
            self.reporter
                .step(&format!("archiving previous theme {previous}..."));
            self.delete_theme(previous)
                .await
                .with_context(|| format!("archiving previous theme {previous}"))?;
            info!(theme_id = previous, "previous theme archived");
        }

        Ok(plan.new_theme_id)
    }

    /// Export `theme_id` and unpack it into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the export job fails or the archive cannot be fetched.
    pub async fn download_theme(
        &self,
        downloader: &impl ThemeDownloader,
        theme_id: &str,
        dest: &Path,
    ) -> Result<PathBuf> {
        let console = self.workbench.open_console().await?;
        let outcome = self.export_on(&console, theme_id).await;
        let download_url = release(console, outcome).await?;

        self.reporter
            .step(&format!("downloading into {}...", dest.display()));
        downloader
            .download(&download_url, dest)
            .await
            .context("downloading theme archive")
    }

    async fn export_on(&self, console: &W::Console, theme_id: &str) -> Result<String> {
        let job = create_export_job(console, theme_id).await?;
        self.reporter.step("waiting for export to finish...");
        let job = await_completion_within(console, self.clock, job, self.poll_timeout)
            .await
            .context("waiting for export job")?;
        self.reporter.success(&format!("exported theme {theme_id}"));
        job.download_url().map(str::to_owned).ok_or_else(|| {
            RemoteError::InvalidResponse {
                operation: "createExportThemeJob".to_string(),
                detail: "expected an export job".to_string(),
            }
            .into()
        })
    }

    /// Export the live theme into `dest`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NoLiveTheme` if nothing is live, or any export error.
    pub async fn download_live_theme(
        &self,
        downloader: &impl ThemeDownloader,
        dest: &Path,
    ) -> Result<PathBuf> {
        let theme_id = self.live_theme_id().await?;
        self.download_theme(downloader, &theme_id, dest).await
    }
}
