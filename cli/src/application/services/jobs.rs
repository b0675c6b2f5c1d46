//! Application service — remote export/import jobs.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Completion is detected by polling: the status is queried, and while the
//! job is not terminal the loop sleeps [`POLL_INTERVAL`] on the injected
//! clock and asks again. Queries for one job are strictly sequential.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{Clock, ThemeConsole};
use crate::domain::{Job, JobError, JobStatus, RemoteError};

/// Delay between two status queries of the same job.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Create an export job for `theme_id`.
///
/// # Errors
///
/// Returns an error if the console rejects the job.
pub async fn create_export_job(console: &impl ThemeConsole, theme_id: &str) -> Result<Job> {
    let job = console
        .create_export_job(theme_id)
        .await
        .with_context(|| format!("creating export job for theme {theme_id}"))?;
    info!(job_id = %job.id, theme_id, "export job created");
    Ok(job)
}

/// Create an import job, reserving a new theme id and upload parameters.
///
/// # Errors
///
/// Returns an error if the console rejects the job.
pub async fn create_import_job(console: &impl ThemeConsole) -> Result<Job> {
    let job = console
        .create_import_job()
        .await
        .context("creating import job")?;
    info!(job_id = %job.id, theme_id = job.theme_id().unwrap_or_default(), "import job created");
    Ok(job)
}

/// Poll `job` until the remote reports it terminal.
///
/// There is no ceiling on the number of polls; wrap the call in
/// [`await_completion_within`] (or drop the future) to bound the wait.
/// Abandoning the wait never cancels the remote job.
///
/// # Errors
///
/// Returns [`JobError::Failed`] as soon as a status query reports a remote
/// error or the job reports failure. No further query is issued after that.
pub async fn await_completion(
    console: &impl ThemeConsole,
    clock: &impl Clock,
    job: Job,
) -> Result<Job> {
    let mut polls: u32 = 0;
    loop {
        polls += 1;
        let status = match console.job_status(&job.id).await {
            Ok(status) => status,
            Err(e) => return Err(into_job_failure(&job.id, e)),
        };
        debug!(job_id = %job.id, polls, ?status, "polled job");
        match status {
            JobStatus::Completed => {
                info!(job_id = %job.id, polls, "job completed");
                return Ok(job.observed(status));
            }
            JobStatus::Failed => {
                return Err(JobError::Failed {
                    job_id: job.id,
                    message: "the remote reported the job as failed".to_string(),
                }
                .into());
            }
            JobStatus::Pending => clock.sleep(POLL_INTERVAL).await,
        }
    }
}

/// [`await_completion`] with an optional client-side deadline.
///
/// # Errors
///
/// Returns [`JobError::TimedOut`] when `limit` elapses first, plus every
/// error of [`await_completion`].
pub async fn await_completion_within(
    console: &impl ThemeConsole,
    clock: &impl Clock,
    job: Job,
    limit: Option<Duration>,
) -> Result<Job> {
    let Some(limit) = limit else {
        return await_completion(console, clock, job).await;
    };
    let job_id = job.id.clone();
    tokio::time::timeout(limit, await_completion(console, clock, job))
        .await
        .map_err(|_| {
            anyhow::Error::from(JobError::TimedOut {
                job_id,
                secs: limit.as_secs(),
            })
        })?
}

/// Remote errors on a status query end the job; anything else (page crash,
/// malformed reply) propagates unchanged.
fn into_job_failure(job_id: &str, err: anyhow::Error) -> anyhow::Error {
    match err.downcast::<RemoteError>() {
        Ok(RemoteError::Operation { message, .. }) => JobError::Failed {
            job_id: job_id.to_string(),
            message,
        }
        .into(),
        Ok(other) => other.into(),
        Err(err) => err,
    }
}
