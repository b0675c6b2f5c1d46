//! Packaged theme archive ready for upload.

/// Content type of packaged themes.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Opaque archive bytes plus what the upload form declares about them.
///
/// Consumed by value by the uploader, so one payload is sent at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl UploadPayload {
    #[must_use]
    pub fn zip(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: ZIP_CONTENT_TYPE.to_string(),
        }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// What the storage endpoint answered to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Page to visit so the remote notices the upload.
    pub tracking_url: String,
    /// HTTP status of the upload response.
    pub status: u16,
}

impl UploadReceipt {
    /// Whether the endpoint answered with a success or a redirect.
    #[must_use]
    pub fn accepted(&self) -> bool {
        (200..400).contains(&self.status)
    }
}
