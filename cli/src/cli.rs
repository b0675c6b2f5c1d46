//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BrowserFlags, OutputFlags};
use crate::commands;

/// Upload and download Help Center themes
#[derive(Parser)]
#[command(
    name = "themer",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Browser executable to drive
    #[arg(long, global = true, env = "THEMER_CHROME", value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a theme and make it live
    Up(commands::up::UpArgs),

    /// Download the live theme
    Down(commands::down::DownArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            headed,
            chrome,
            command,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            browser: BrowserFlags { headed, chrome },
        });
        match command {
            Command::Up(args) => commands::up::run(&app, args).await,
            Command::Down(args) => commands::down::run(&app, args).await,
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
        }
    }
}
