//! HTTP infrastructure — presigned upload and export download.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use tracing::debug;

use crate::application::ports::{BlobUploader, ThemeDownloader};
use crate::domain::{UploadFields, UploadPayload, UploadReceipt};
use crate::infra::archive::extract_zip;

/// Form field that names the redirect target after a successful upload.
pub const REDIRECT_FIELD: &str = "success_action_redirect";
/// Multipart part carrying the archive. Storage endpoints require it last.
pub const FILE_FIELD: &str = "file";

/// Production `BlobUploader` posting multipart forms with `reqwest`.
///
/// Redirects are not followed: the redirect target is the tracking URL.
pub struct HttpBlobUploader {
    client: reqwest::Client,
}

impl HttpBlobUploader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .context("building upload client")?;
        Ok(Self { client })
    }
}

/// Build the upload form: server fields in server order, then the file part.
///
/// # Errors
///
/// Returns an error if the payload's content type is not a valid MIME type.
pub fn upload_form(payload: UploadPayload, fields: &UploadFields) -> Result<Form> {
    let mut form = Form::new();
    for (key, value) in fields.iter() {
        form = form.text(key.to_string(), value.to_string());
    }
    let part = Part::bytes(payload.bytes)
        .file_name(payload.file_name)
        .mime_str(&payload.content_type)
        .context("invalid payload content type")?;
    Ok(form.part(FILE_FIELD, part))
}

impl BlobUploader for HttpBlobUploader {
    async fn upload(
        &self,
        payload: UploadPayload,
        url: &str,
        fields: &UploadFields,
    ) -> Result<UploadReceipt> {
        debug!(url, size = payload.size(), fields = fields.len(), "uploading payload");
        let form = upload_form(payload, fields)?;
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("posting upload to {url}"))?;

        let status = response.status();
        debug!(%status, "upload answered");
        let location = response.headers().get(LOCATION).and_then(|v| v.to_str().ok());
        let tracking_url = tracking_url(location, fields).ok_or_else(|| {
            anyhow::anyhow!("upload response carried no tracking URL (HTTP {status})")
        })?;
        Ok(UploadReceipt {
            tracking_url,
            status: status.as_u16(),
        })
    }
}

/// The `Location` the storage endpoint redirected to, else the redirect field
/// the form asked for.
#[must_use]
pub fn tracking_url(location: Option<&str>, fields: &UploadFields) -> Option<String> {
    location
        .filter(|l| !l.is_empty())
        .or_else(|| fields.get(REDIRECT_FIELD))
        .map(str::to_owned)
}

/// Production `ThemeDownloader` fetching export archives with `reqwest`.
pub struct HttpThemeDownloader {
    client: reqwest::Client,
}

impl HttpThemeDownloader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("building download client")?;
        Ok(Self { client })
    }
}

impl ThemeDownloader for HttpThemeDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        debug!(url, dest = %dest.display(), "downloading export");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("downloading {url}"))?
            .error_for_status()
            .context("export download failed")?;
        let bytes = response.bytes().await.context("reading export body")?.to_vec();

        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip(bytes, &target))
            .await
            .context("spawn_blocking for extract")??;
        Ok(dest.to_path_buf())
    }
}
