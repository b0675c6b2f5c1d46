//! Infrastructure implementation of the browser ports over Chromium.
//!
//! `ChromiumContext` launches a Chromium process through the DevTools
//! protocol and drives its event handler on a background task. Each
//! `ChromiumPage` wraps one tab.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::EventFrameNavigated;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use futures_util::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::{BrowserContext, BrowserPage};
use crate::domain::{Cookie, SessionError};

/// Interval between two selector probes.
const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Launch options for the browser process.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Show the browser window instead of running headless.
    pub headed: bool,
    /// Explicit Chromium/Chrome executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// Ceiling for page navigations.
    pub navigation_timeout: Duration,
}

/// Production `BrowserContext` backed by a launched Chromium process.
pub struct ChromiumContext {
    browser: Browser,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumContext {
    /// Launch Chromium and start pumping its DevTools events.
    ///
    /// # Errors
    ///
    /// Returns an error if no browser executable is found or it fails to start.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if options.headed {
            builder = builder.with_head();
        }
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("invalid browser configuration: {e}"))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("launching Chromium (set THEMER_CHROME to the browser executable)")?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser event handler stopped");
                    break;
                }
            }
        });
        debug!(headed = options.headed, "browser launched");

        Ok(Self {
            browser,
            handler,
            navigation_timeout: options.navigation_timeout,
        })
    }
}

impl BrowserContext for ChromiumContext {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<Self::Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("opening browser page")?;
        Ok(ChromiumPage {
            page,
            navigation_timeout: self.navigation_timeout,
        })
    }

    async fn close(self) -> Result<()> {
        let Self {
            mut browser,
            handler,
            ..
        } = self;
        let closed = browser.close().await.context("closing browser");
        if closed.is_ok() {
            if let Err(e) = browser.wait().await {
                warn!(error = %e, "browser process did not exit cleanly");
            }
        }
        handler.abort();
        closed?;
        debug!("browser closed");
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: Page,
    navigation_timeout: Duration,
}

fn timeout_error(what: impl Into<String>, limit: Duration) -> anyhow::Error {
    SessionError::Timeout {
        what: what.into(),
        secs: limit.as_secs(),
    }
    .into()
}

/// Run `action`, then wait up to `limit` for the first event accepted by
/// `is_match`.
///
/// `events` must already be subscribed when this is called so an event
/// fired while `action` is still running is buffered rather than lost.
async fn act_then_await<S, F>(
    events: S,
    action: F,
    is_match: impl Fn(&S::Item) -> bool,
    limit: Duration,
) -> Result<()>
where
    S: Stream,
    F: Future<Output = Result<()>>,
{
    let mut events = std::pin::pin!(events);
    action.await?;
    let next = async {
        while let Some(event) = events.next().await {
            if is_match(&event) {
                return Ok(());
            }
        }
        Err(anyhow::anyhow!("page closed before navigating"))
    };
    tokio::time::timeout(limit, next)
        .await
        .map_err(|_| timeout_error("navigation after form submission", limit))?
}

impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| timeout_error(format!("navigation to {url}"), self.navigation_timeout))?
            .with_context(|| format!("navigating to {url}"))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow::anyhow!("invalid evaluate parameters: {e}"))?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .context("evaluating script")?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn evaluate_and_wait_for_navigation(&self, script: &str, timeout: Duration) -> Result<()> {
        let navigated = self
            .page
            .event_listener::<EventFrameNavigated>()
            .await
            .context("subscribing to navigation events")?;
        act_then_await(
            navigated,
            async {
                self.evaluate(script).await?;
                Ok(())
            },
            |event| event.frame.parent_id.is_none(),
            timeout,
        )
        .await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(timeout_error(format!("selector {selector}"), timeout));
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        let cookies = self.page.get_cookies().await.context("reading cookies")?;
        Ok(cookies
            .into_iter()
            .map(|c| Cookie::new(c.name, c.value))
            .collect())
    }

    async fn close(self) -> Result<()> {
        self.page.close().await.context("closing browser page")
    }
}
