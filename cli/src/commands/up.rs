//! `themer up` — upload a theme folder and make it live.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::theme_transfer::ThemeTransfer;
use crate::commands::{finish_session, load_config, open_session, prompt_config};
use crate::domain::ThemerConfig;
use crate::domain::config::CONFIG_FILE_NAME;
use crate::infra::archive::{ZipPackager, ensure_source_dir};
use crate::infra::clock::TokioClock;
use crate::infra::http::HttpBlobUploader;
use crate::output::json::format_result;

/// Arguments for the up command.
#[derive(Args)]
pub struct UpArgs {
    /// Theme folder, or a themer.json config file
    pub src: PathBuf,

    /// Keep the previously live theme instead of archiving it
    #[arg(short, long)]
    pub persist: bool,

    /// Stop waiting for a remote job after this many seconds
    #[arg(long, value_name = "SECS")]
    pub job_timeout: Option<u64>,
}

/// Where the config comes from for a given `src`.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// `src` names a config file.
    File(PathBuf),
    /// `src` is a folder holding a config file.
    Folder(PathBuf),
    /// Nothing on disk; ask the user.
    Prompt,
}

/// Decide where `up` reads its config from.
#[must_use]
pub fn config_source(src: &Path) -> ConfigSource {
    if src.extension().is_some_and(|ext| ext == "json") {
        return ConfigSource::File(src.to_path_buf());
    }
    let candidate = src.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        ConfigSource::Folder(candidate)
    } else {
        ConfigSource::Prompt
    }
}

/// Folder to upload: the config target, else the folder argument.
///
/// `None` means a config file was given without a target.
#[must_use]
pub fn upload_dir(config: &ThemerConfig, src: &Path) -> Option<PathBuf> {
    if let Some(target) = &config.target {
        return Some(target.clone());
    }
    let is_config_file = src.extension().is_some_and(|ext| ext == "json");
    (!is_config_file).then(|| src.to_path_buf())
}

/// Run the up command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the folder is not a
/// directory, login fails, or any swap step fails.
pub async fn run(app: &AppContext, args: UpArgs) -> Result<()> {
    let config = match config_source(&args.src) {
        ConfigSource::File(path) | ConfigSource::Folder(path) => load_config(&path)?,
        ConfigSource::Prompt => prompt_config(app)?,
    };

    let dir = match upload_dir(&config, &args.src) {
        Some(dir) => dir,
        None => PathBuf::from(app.input(
            "target",
            "Please specify theme folder to upload",
            Some("."),
        )?),
    };
    ensure_source_dir(&dir)?;

    let uploader = HttpBlobUploader::new()?;
    let session = open_session(app, &config).await?;

    let reporter = app.reporter();
    let clock = TokioClock;
    let transfer = ThemeTransfer::new(&session, &clock, &reporter)
        .with_poll_timeout(args.job_timeout.map(Duration::from_secs));
    let outcome = transfer
        .update_live_theme(&ZipPackager, &uploader, &dir, args.persist)
        .await
        .with_context(|| format!("upload a live theme from \"{}\"", dir.display()));
    let theme_id = finish_session(session, outcome).await?;

    if app.is_json() {
        println!(
            "{}",
            format_result(&serde_json::json!({
                "themeId": theme_id,
                "source": dir,
                "persist": args.persist,
            }))?
        );
    } else {
        app.output.success("upload complete!");
        app.output.kv("live theme:", &theme_id);
    }
    Ok(())
}
