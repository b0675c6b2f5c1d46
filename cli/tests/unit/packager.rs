//! Archive packager tests on real directories.

use std::io::{Cursor, Read};

use themer_cli::application::ports::ThemePackager;
use themer_cli::domain::PackageError;
use themer_cli::domain::payload::ZIP_CONTENT_TYPE;
use themer_cli::infra::archive::{ARCHIVE_FILE_NAME, ZipPackager, extract_zip, pack_dir};

use crate::helpers::write_theme;

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

#[tokio::test]
async fn test_pack_keeps_relative_paths_in_sorted_order() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_theme(dir.path());

    let payload = ZipPackager.pack(dir.path()).await.expect("pack");

    assert_eq!(payload.file_name, ARCHIVE_FILE_NAME);
    assert_eq!(payload.content_type, ZIP_CONTENT_TYPE);
    assert_eq!(
        entry_names(&payload.bytes),
        vec![
            "assets/img/logo.svg",
            "manifest.json",
            "templates/home_page.hbs"
        ]
    );
}

#[tokio::test]
async fn test_pack_preserves_file_content() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_theme(dir.path());

    let payload = ZipPackager.pack(dir.path()).await.expect("pack");

    let mut archive = zip::ZipArchive::new(Cursor::new(payload.bytes)).expect("zip");
    let mut content = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest")
        .read_to_string(&mut content)
        .expect("read");
    assert_eq!(content, r#"{"name":"Acme"}"#);
}

#[tokio::test]
async fn test_pack_missing_directory_is_invalid_source() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope");

    let err = ZipPackager.pack(&missing).await.expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::InvalidSource(_))
    ));
}

#[tokio::test]
async fn test_pack_regular_file_is_invalid_source() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let file = dir.path().join("theme.zip");
    std::fs::write(&file, b"not a dir").expect("write");

    let err = ZipPackager.pack(&file).await.expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::InvalidSource(_))
    ));
}

#[test]
fn test_empty_directory_packs_to_empty_archive() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let bytes = pack_dir(dir.path()).expect("pack");
    assert!(entry_names(&bytes).is_empty());
}

#[test]
fn test_extract_recreates_tree() {
    let src = tempfile::TempDir::new().expect("temp dir");
    write_theme(src.path());
    let bytes = pack_dir(src.path()).expect("pack");

    let dest = tempfile::TempDir::new().expect("temp dir");
    let target = dest.path().join("acme.zendesk.com");
    extract_zip(bytes, &target).expect("extract");

    let hbs = std::fs::read_to_string(target.join("templates").join("home_page.hbs"))
        .expect("template");
    assert_eq!(hbs, "<h1>{{t 'hi'}}</h1>");
    assert!(target.join("assets").join("img").join("logo.svg").is_file());
}

#[test]
fn test_extract_rejects_non_zip_bytes() {
    let dest = tempfile::TempDir::new().expect("temp dir");
    let err = extract_zip(b"plain text".to_vec(), dest.path()).expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<PackageError>(),
        Some(PackageError::Archive(_))
    ));
}
