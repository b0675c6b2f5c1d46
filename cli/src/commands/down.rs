//! `themer down` — download the live theme.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::theme_transfer::ThemeTransfer;
use crate::commands::{finish_session, load_config, open_session, prompt_config};
use crate::domain::ThemerConfig;
use crate::domain::config::CONFIG_FILE_NAME;
use crate::infra::clock::TokioClock;
use crate::infra::config::JsonConfigStore;
use crate::infra::http::HttpThemeDownloader;
use crate::output::json::format_result;

/// Arguments for the down command.
#[derive(Args)]
pub struct DownArgs {
    /// Load settings from a themer.json file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder to extract the theme into
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Default download folder: `./<host>`.
#[must_use]
pub fn default_dir(config: &ThemerConfig) -> PathBuf {
    Path::new(".").join(config.host())
}

/// Config saved next to a downloaded theme, pointing at its own folder.
#[must_use]
pub fn saved_config(config: &ThemerConfig) -> ThemerConfig {
    ThemerConfig {
        target: Some(PathBuf::from("./")),
        ..config.clone()
    }
}

/// Run the down command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, login fails, nothing is
/// live, or the export cannot be downloaded.
pub async fn run(app: &AppContext, args: DownArgs) -> Result<()> {
    let prompted = args.config.is_none();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => prompt_config(app)?,
    };

    let dest = match args.out.or_else(|| config.target.clone()) {
        Some(dir) => dir,
        None => {
            let default = default_dir(&config).to_string_lossy().into_owned();
            PathBuf::from(app.input(
                "out",
                "Please specify folder to download into",
                Some(default.as_str()),
            )?)
        }
    };

    let downloader = HttpThemeDownloader::new()?;
    let session = open_session(app, &config).await?;

    let reporter = app.reporter();
    let clock = TokioClock;
    let transfer = ThemeTransfer::new(&session, &clock, &reporter);
    let outcome = transfer
        .download_live_theme(&downloader, &dest)
        .await
        .context("download live theme");
    let dir = finish_session(session, outcome).await?;

    if app.is_json() {
        println!(
            "{}",
            format_result(&serde_json::json!({ "destination": dir }))?
        );
    } else {
        app.output
            .success(&format!("live theme downloaded into {}", dir.display()));
    }

    if offers_config_save(prompted, app.is_json())
        && app.confirm("Do you want to save the current config?", false)?
    {
        let path = dir.join(CONFIG_FILE_NAME);
        JsonConfigStore.save(&path, &saved_config(&config))?;
        app.output.success("config saved.");
    }
    Ok(())
}

/// Offer to save prompted options, unless stdout belongs to JSON output.
fn offers_config_save(prompted: bool, json: bool) -> bool {
    prompted && !json
}
