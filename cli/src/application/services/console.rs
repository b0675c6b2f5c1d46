//! Application service — the theme console page.
//!
//! A console page is a browser page parked on the theming workbench with the
//! helper script installed. Remote operations are forwarded into the page as
//! [`RemoteCommand`]s and their replies validated before they leave here.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::ports::{BrowserContext, BrowserPage, ThemeConsole};
use crate::domain::command::HELPER_SCRIPT;
use crate::domain::session::WORKBENCH_READY_SELECTOR;
use crate::domain::{Job, JobStatus, RemoteCommand, ThemeInfo, UploadFields};

/// An open console page. Close it with [`ThemeConsole::close`] or [`release`].
pub struct ConsolePage<P: BrowserPage> {
    page: P,
}

impl<P: BrowserPage> ConsolePage<P> {
    /// Open a page at `url`, wait for the workbench marker, and install the helper.
    ///
    /// If any step after the page is created fails, the page is closed before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails, the marker does not appear within
    /// `ready_timeout`, or the helper cannot be installed.
    pub async fn open<C>(context: &C, url: &str, ready_timeout: Duration) -> Result<Self>
    where
        C: BrowserContext<Page = P>,
    {
        let page = context.new_page().await.context("opening console page")?;
        debug!(url, "console page opened");
        match prepare(&page, url, ready_timeout).await {
            Ok(()) => Ok(Self { page }),
            Err(e) => {
                if let Err(close_err) = page.close().await {
                    warn!(error = %close_err, "failed to close console page after error");
                }
                Err(e)
            }
        }
    }

    /// Forward `command` into the page and return its validated result value.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Operation` if the remote call rejected, or
    /// `RemoteError::InvalidResponse` if the reply is malformed.
    pub async fn invoke(&self, command: &RemoteCommand) -> Result<Value> {
        debug!(operation = command.name(), "invoking console operation");
        let reply = self
            .page
            .evaluate(&command.to_script())
            .await
            .with_context(|| format!("evaluating '{}' in console page", command.name()))?;
        command.parse_reply(reply)
    }

    async fn invoke_as<T: DeserializeOwned>(&self, command: &RemoteCommand) -> Result<T> {
        let value = self.invoke(command).await?;
        serde_json::from_value(value).map_err(|e| command.invalid(e.to_string()).into())
    }
}

async fn prepare(page: &impl BrowserPage, url: &str, ready_timeout: Duration) -> Result<()> {
    page.goto(url).await.context("opening theming workbench")?;
    page.wait_for_selector(WORKBENCH_READY_SELECTOR, ready_timeout)
        .await
        .context("waiting for theming workbench")?;
    page.evaluate(HELPER_SCRIPT)
        .await
        .context("installing console helper")?;
    Ok(())
}

/// Close `console`, then hand back `outcome`.
///
/// The operation's own error wins over a close error, which is then only logged.
///
/// # Errors
///
/// Returns the operation's error, or the close error if the operation succeeded.
pub async fn release<C: ThemeConsole, T>(console: C, outcome: Result<T>) -> Result<T> {
    let closed = console.close().await;
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err.context("closing console page")),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "failed to close console page after error");
            Err(e)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportJobReply {
    job_id: String,
    download_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportJobReply {
    job_id: String,
    theme_id: String,
    upload_url: String,
    upload_params: Value,
}

impl<P: BrowserPage> ThemeConsole for ConsolePage<P> {
    async fn list_themes(&self) -> Result<Vec<ThemeInfo>> {
        self.invoke_as(&RemoteCommand::ListThemes).await
    }

    async fn create_export_job(&self, theme_id: &str) -> Result<Job> {
        let command = RemoteCommand::CreateExportThemeJob {
            theme_id: theme_id.to_string(),
        };
        let reply: ExportJobReply = self.invoke_as(&command).await?;
        Ok(Job::export(reply.job_id, reply.download_url))
    }

    async fn create_import_job(&self) -> Result<Job> {
        let command = RemoteCommand::CreateImportThemeJob;
        let reply: ImportJobReply = self.invoke_as(&command).await?;
        let raw_params = match reply.upload_params {
            Value::String(s) => s,
            other @ Value::Object(_) => other.to_string(),
            other => {
                return Err(command
                    .invalid(format!("upload params must be an object, got {other}"))
                    .into());
            }
        };
        let fields = UploadFields::parse(&raw_params)?;
        Ok(Job::import(reply.job_id, reply.theme_id, reply.upload_url, fields))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let command = RemoteCommand::GetJobStatus {
            job_id: job_id.to_string(),
        };
        match self.invoke(&command).await? {
            Value::String(status) => Ok(JobStatus::from_remote(&status)),
            other => Err(command
                .invalid(format!("expected a status string, got {other}"))
                .into()),
        }
    }

    async fn publish_theme(&self, theme_id: &str) -> Result<()> {
        self.invoke(&RemoteCommand::PublishTheme {
            theme_id: theme_id.to_string(),
        })
        .await
        .map(drop)
    }

    async fn archive_theme(&self, theme_id: &str) -> Result<()> {
        self.invoke(&RemoteCommand::ArchiveTheme {
            theme_id: theme_id.to_string(),
        })
        .await
        .map(drop)
    }

    async fn close(self) -> Result<()> {
        debug!("closing console page");
        self.page.close().await
    }
}
