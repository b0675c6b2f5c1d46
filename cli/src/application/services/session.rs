//! Application service — authenticated browser session.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! The authentication cookie is the single source of truth for login success.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::ports::{BrowserContext, BrowserPage, Workbench};
use crate::application::services::console::ConsolePage;
use crate::domain::config::route_url;
use crate::domain::session::{
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_SELECTOR_TIMEOUT, EMAIL_FIELD_SELECTOR,
    LOGIN_FORM_SELECTOR, PASSWORD_FIELD_SELECTOR, SIGNIN_ROUTE, WORKBENCH_ROUTE,
};
use crate::domain::{SessionError, is_authenticated};

/// Upper bounds for page waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub navigation: Duration,
    pub selector: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: DEFAULT_NAVIGATION_TIMEOUT,
            selector: DEFAULT_SELECTOR_TIMEOUT,
        }
    }
}

/// Login credentials for the console.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// An authenticated browsing context bound to one Help Center.
///
/// Only [`login`] builds a `Session`, so every console page it opens runs
/// behind the authentication cookie. Closing the session closes the context.
pub struct Session<C: BrowserContext> {
    domain: String,
    context: C,
    /// Sign-in page left open so the context keeps its cookies warm.
    anchor: Option<C::Page>,
    authenticated: bool,
    timeouts: Timeouts,
}

/// Log in to `domain` inside `context`.
///
/// Navigates to the sign-in page and returns right away if the
/// authentication cookie is already present. Otherwise fills the login form
/// (following it into its frame when embedded), submits it, waits for the
/// navigation to settle, and checks the cookie again.
///
/// On failure the context is closed before the error is returned.
///
/// # Errors
///
/// Returns [`SessionError::Authentication`] when the cookie is still absent
/// after submission, or a navigation/selector [`SessionError::Timeout`].
pub async fn login<C: BrowserContext>(
    context: C,
    domain: &str,
    credentials: Credentials<'_>,
    timeouts: Timeouts,
) -> Result<Session<C>> {
    let page = match context.new_page().await {
        Ok(page) => page,
        Err(e) => {
            close_quietly(context).await;
            return Err(e.context("opening login page"));
        }
    };

    match attempt_login(&page, domain, credentials, timeouts).await {
        Ok(true) => {
            info!(domain, "logged in");
            Ok(Session {
                domain: domain.to_string(),
                context,
                anchor: Some(page),
                authenticated: true,
                timeouts,
            })
        }
        outcome => {
            if let Err(e) = page.close().await {
                warn!(error = %e, "failed to close login page");
            }
            close_quietly(context).await;
            match outcome {
                Err(e) => Err(e),
                Ok(_) => Err(SessionError::Authentication {
                    domain: domain.to_string(),
                }
                .into()),
            }
        }
    }
}

/// Whether the page's cookie jar carries the authentication cookie.
///
/// # Errors
///
/// Returns an error if the cookies cannot be read.
pub async fn is_logged_in(page: &impl BrowserPage) -> Result<bool> {
    Ok(is_authenticated(&page.cookies().await?))
}

async fn attempt_login(
    page: &impl BrowserPage,
    domain: &str,
    credentials: Credentials<'_>,
    timeouts: Timeouts,
) -> Result<bool> {
    page.goto(&route_url(domain, SIGNIN_ROUTE)?)
        .await
        .context("opening sign-in page")?;
    if is_logged_in(page).await? {
        debug!("authentication cookie already present");
        return Ok(true);
    }

    locate_login_form(page, timeouts).await?;
    page.evaluate(&fill_form_script(credentials))
        .await
        .context("filling login form")?;
    page.evaluate_and_wait_for_navigation(&submit_form_script(), timeouts.navigation)
        .await
        .context("submitting login form")?;

    is_logged_in(page).await
}

/// Bring the login form into the page's top document.
///
/// The sign-in page may render the form inside a frame; in that case the
/// page follows the frame's source so the form can be scripted directly.
async fn locate_login_form(page: &impl BrowserPage, timeouts: Timeouts) -> Result<()> {
    page.wait_for_selector(&format!("{LOGIN_FORM_SELECTOR}, iframe"), timeouts.selector)
        .await
        .context("waiting for login form")?;

    let frame_src = page
        .evaluate(&locate_form_script())
        .await
        .context("locating login form")?;
    if let Value::String(src) = frame_src {
        if !src.is_empty() {
            debug!(src, "login form is framed, following frame");
            page.goto(&src).await.context("opening login frame")?;
        }
    }

    page.wait_for_selector(LOGIN_FORM_SELECTOR, timeouts.selector)
        .await
        .context("waiting for login form")
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn locate_form_script() -> String {
    format!(
        "(() => {{ if (document.querySelector({form})) return null; \
         const frame = document.querySelector('iframe'); \
         return frame ? frame.src : null; }})()",
        form = js_string(LOGIN_FORM_SELECTOR),
    )
}

fn fill_form_script(credentials: Credentials<'_>) -> String {
    format!(
        "(() => {{ const fill = (selector, value) => {{ \
         const el = document.querySelector(selector); \
         if (!el) throw new Error('missing field ' + selector); \
         el.focus(); el.value = value; \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); }}; \
         fill({email_sel}, {email}); fill({password_sel}, {password}); return true; }})()",
        email_sel = js_string(EMAIL_FIELD_SELECTOR),
        email = js_string(credentials.email),
        password_sel = js_string(PASSWORD_FIELD_SELECTOR),
        password = js_string(credentials.password),
    )
}

fn submit_form_script() -> String {
    format!(
        "(() => {{ document.querySelector({form}).submit(); return true; }})()",
        form = js_string(&format!("form{LOGIN_FORM_SELECTOR}")),
    )
}

async fn close_quietly(context: impl BrowserContext) {
    if let Err(e) = context.close().await {
        warn!(error = %e, "failed to close browser context");
    }
}

impl<C: BrowserContext> Session<C> {
    /// Help Center base URL this session is bound to.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Re-check the authentication cookie on the session's anchor page.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookies cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool> {
        match &self.anchor {
            Some(page) => is_logged_in(page).await,
            None => Ok(false),
        }
    }

    /// Close the anchor page and the browsing context.
    ///
    /// # Errors
    ///
    /// Returns an error if the context fails to close.
    pub async fn close(self) -> Result<()> {
        if let Some(page) = self.anchor {
            if let Err(e) = page.close().await {
                warn!(error = %e, "failed to close login page");
            }
        }
        self.context.close().await.context("closing browser")
    }
}

impl<C: BrowserContext> Workbench for Session<C> {
    type Console = ConsolePage<C::Page>;

    async fn open_console(&self) -> Result<Self::Console> {
        if !self.authenticated {
            return Err(SessionError::NotAuthenticated.into());
        }
        let url = route_url(&self.domain, WORKBENCH_ROUTE)?;
        ConsolePage::open(&self.context, &url, self.timeouts.selector).await
    }

    async fn visit(&self, url: &str) -> Result<()> {
        if !self.authenticated {
            return Err(SessionError::NotAuthenticated.into());
        }
        let page = self.context.new_page().await.context("opening page")?;
        let visited = page.goto(url).await;
        let closed = page.close().await;
        visited.with_context(|| format!("visiting {url}"))?;
        closed.context("closing page")
    }
}
