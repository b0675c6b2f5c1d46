//! Command implementations

pub mod down;
pub mod up;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::session::{Credentials, Session, login};
use crate::domain::ThemerConfig;
use crate::infra::browser::ChromiumContext;
use crate::infra::config::JsonConfigStore;
use crate::output::progress;

/// Load and validate a config file.
pub(crate) fn load_config(path: &Path) -> Result<ThemerConfig> {
    JsonConfigStore
        .load(path)
        .with_context(|| format!("loading config {}", path.display()))?
        .validated()
}

/// Ask for the Help Center domain and login credentials.
pub(crate) fn prompt_config(app: &AppContext) -> Result<ThemerConfig> {
    let domain = app.input("domain", "Enter zendesk hc domain", None)?;
    let email = app.input("email", "Enter zendesk email for login", None)?;
    let password = app.password("password", "Enter zendesk password for login")?;
    ThemerConfig {
        domain,
        email,
        password,
        target: None,
    }
    .validated()
}

/// Launch the browser and log in.
pub(crate) async fn open_session(
    app: &AppContext,
    config: &ThemerConfig,
) -> Result<Session<ChromiumContext>> {
    let credentials = Credentials {
        email: &config.email,
        password: &config.password,
    };
    progress::track(
        app.output.show_progress(),
        "attempt login.",
        "logged in.",
        async {
            let context = ChromiumContext::launch(&app.launch).await?;
            login(context, &config.domain, credentials, app.timeouts).await
        },
    )
    .await
    .context("attempt login")
}

/// Close `session` after `outcome`; the outcome's error takes precedence.
pub(crate) async fn finish_session<T>(
    session: Session<ChromiumContext>,
    outcome: Result<T>,
) -> Result<T> {
    let closed = session.close().await;
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "failed to close browser after error");
            Err(e)
        }
    }
}
