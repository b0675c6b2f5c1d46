//! Themer CLI - Help Center theme upload and download

use clap::Parser;
use tracing_subscriber::EnvFilter;

use themer_cli::cli::Cli;
use themer_cli::output::json::{error_code, format_error};

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "THEMER_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,themer_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    if let Err(e) = cli.run().await {
        if json {
            match format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(out) => println!("{out}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
