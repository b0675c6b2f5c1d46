//! Filesystem infrastructure — zip packing and unpacking of theme folders.
//!
//! Blocking archive work runs on `spawn_blocking`.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::application::ports::ThemePackager;
use crate::domain::{PackageError, UploadPayload};

/// Archive name declared in the upload form.
pub const ARCHIVE_FILE_NAME: &str = "theme.zip";

/// Production `ThemePackager` producing deflated zip archives.
pub struct ZipPackager;

impl ThemePackager for ZipPackager {
    async fn pack(&self, source: &Path) -> Result<UploadPayload> {
        ensure_source_dir(source)?;
        let source = source.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || pack_dir(&source))
            .await
            .context("spawn_blocking for pack")??;
        Ok(UploadPayload::zip(bytes, ARCHIVE_FILE_NAME))
    }
}

/// Fail unless `source` is an existing directory.
///
/// # Errors
///
/// Returns [`PackageError::InvalidSource`] otherwise.
pub fn ensure_source_dir(source: &Path) -> Result<()> {
    if source.is_dir() {
        Ok(())
    } else {
        Err(PackageError::InvalidSource(source.to_path_buf()).into())
    }
}

/// Zip every file under `source`, keyed by its `/`-separated relative path.
///
/// Entries are written in sorted path order with the zip default timestamp,
/// so the same tree always yields the same entry list.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the archive cannot be written.
pub fn pack_dir(source: &Path) -> Result<Vec<u8>> {
    let mut files = Vec::new();
    collect_files(source, &mut files)
        .with_context(|| format!("listing {}", source.display()))?;
    files.sort();

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for path in &files {
        let name = entry_name(source, path)?;
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| PackageError::Archive(e.to_string()))?;
        let content =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        writer
            .write_all(&content)
            .with_context(|| format!("compressing {name}"))?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| PackageError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Unpack zip `bytes` into `dest`, creating it if needed.
///
/// Entries whose names would escape `dest` are rejected by the zip reader.
///
/// # Errors
///
/// Returns an error if the bytes are not a zip archive or a file cannot be written.
pub fn extract_zip(bytes: Vec<u8>, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| PackageError::Archive(e.to_string()))?;
    archive
        .extract(dest)
        .map_err(|e| PackageError::Archive(e.to_string()))?;
    Ok(())
}

/// Collect all regular files under a directory recursively.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
