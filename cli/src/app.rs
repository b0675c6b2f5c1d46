//! Application context — unified state passed to every command handler.
//!
//! `AppContext` carries the output context, the browser launch options and
//! the interactive prompts so command signatures stay `(&AppContext, args)`.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::services::session::Timeouts;
use crate::domain::ConfigError;
use crate::infra::browser::LaunchOptions;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Browser flags.
pub struct BrowserFlags {
    /// Show the browser window.
    pub headed: bool,
    /// Explicit browser executable.
    pub chrome: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Browser options.
    pub browser: BrowserFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// How to launch the browser.
    pub launch: LaunchOptions,
    /// Page wait ceilings used by the session.
    pub timeouts: Timeouts,
    /// Whether stdin can answer prompts.
    pub interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode owns stdout, so human progress is silenced.
        let quiet = flags.output.quiet || flags.output.json;
        let timeouts = Timeouts::default();

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            launch: LaunchOptions {
                headed: flags.browser.headed,
                executable: flags.browser.chrome.clone(),
                navigation_timeout: timeouts.navigation,
            },
            timeouts,
            interactive: std::io::stdin().is_terminal(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Progress reporter bound to this context's output.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Ask the user for confirmation.
    ///
    /// Without a terminal on stdin, returns `default` without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    /// Prompt for a line of text, offering `default` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming `field` when stdin is not
    /// a terminal, or an error if the prompt fails.
    pub fn input(&self, field: &'static str, prompt: &str, default: Option<&str>) -> Result<String> {
        if !self.interactive {
            return Err(ConfigError::MissingField(field).into());
        }
        let mut input = dialoguer::Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .with_context(|| format!("reading {field}"))
    }

    /// Prompt for a secret without echo.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming `field` when stdin is not
    /// a terminal, or an error if the prompt fails.
    pub fn password(&self, field: &'static str, prompt: &str) -> Result<String> {
        if !self.interactive {
            return Err(ConfigError::MissingField(field).into());
        }
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .with_context(|| format!("reading {field}"))
    }
}
