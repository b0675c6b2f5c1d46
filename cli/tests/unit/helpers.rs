//! Shared test helpers: in-memory fakes of the browser, console and transfer ports.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};
use themer_cli::application::ports::{
    BlobUploader, BrowserContext, BrowserPage, Clock, ProgressReporter, ThemeConsole,
    ThemeDownloader, Workbench,
};
use themer_cli::domain::command::HELPER_SCRIPT;
use themer_cli::domain::session::{AUTH_COOKIE_NAME, AUTH_COOKIE_VALUE};
use themer_cli::domain::{
    Cookie, Job, JobStatus, RemoteError, SessionError, ThemeInfo, UploadFields, UploadPayload,
    UploadReceipt,
};

pub const DOMAIN: &str = "https://acme.zendesk.com";

pub fn theme(id: &str, live: bool) -> ThemeInfo {
    ThemeInfo {
        id: id.to_string(),
        name: format!("Theme {id}"),
        is_live: live,
    }
}

// ── Browser fakes ────────────────────────────────────────────────────────────

/// Shared state of a fake browser: counters, cookies, and scripted replies.
#[derive(Default)]
pub struct BrowserState {
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub context_closed: AtomicBool,
    /// Whether the authentication cookie is in the jar.
    pub authenticated: AtomicBool,
    /// Whether submitting the login form sets the cookie.
    pub accepts_login: AtomicBool,
    /// Selectors that never appear.
    pub missing_selectors: Mutex<Vec<String>>,
    pub visited: Mutex<Vec<String>>,
    pub scripts: Mutex<Vec<String>>,
    /// Replies to console invocations, as `{ok}`/`{error}` envelopes, in order.
    pub replies: Mutex<VecDeque<Value>>,
    /// Value returned when the login-form locator runs (a frame src or null).
    pub frame_src: Mutex<Option<String>>,
    /// `submit`, `navigated` and `cookies` events in the order they happened.
    pub events: Mutex<Vec<&'static str>>,
}

impl BrowserState {
    pub fn opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    pub fn push_reply(&self, reply: Value) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn log(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct FakeContext {
    pub state: Arc<BrowserState>,
}

impl FakeContext {
    pub fn new() -> (Self, Arc<BrowserState>) {
        let state = Arc::new(BrowserState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl BrowserContext for FakeContext {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage> {
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            state: Arc::clone(&self.state),
        })
    }

    async fn close(self) -> Result<()> {
        self.state.context_closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    pub state: Arc<BrowserState>,
}

impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.state.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.state.scripts.lock().unwrap().push(script.to_string());
        if script == HELPER_SCRIPT {
            return Ok(Value::Null);
        }
        if script.contains("__themer") {
            return Ok(self
                .state
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| json!({ "ok": null })));
        }
        if script.contains("iframe") {
            return Ok(self
                .state
                .frame_src
                .lock()
                .unwrap()
                .clone()
                .map_or(Value::Null, Value::String));
        }
        Ok(Value::Bool(true))
    }

    /// The submit returns before the navigation it starts has landed; the
    /// cookie only shows up once the wait resolves.
    async fn evaluate_and_wait_for_navigation(&self, script: &str, _timeout: Duration) -> Result<()> {
        self.state.scripts.lock().unwrap().push(script.to_string());
        self.state.log("submit");
        tokio::task::yield_now().await;
        if self.state.accepts_login.load(Ordering::SeqCst) {
            self.state.authenticated.store(true, Ordering::SeqCst);
        }
        self.state.log("navigated");
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self
            .state
            .missing_selectors
            .lock()
            .unwrap()
            .iter()
            .any(|s| s == selector)
        {
            return Err(SessionError::Timeout {
                what: format!("selector {selector}"),
                secs: timeout.as_secs(),
            }
            .into());
        }
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        self.state.log("cookies");
        let mut jar = vec![Cookie::new("_help_center_session", "abc")];
        if self.state.authenticated.load(Ordering::SeqCst) {
            jar.push(Cookie::new(AUTH_COOKIE_NAME, AUTH_COOKIE_VALUE));
        }
        Ok(jar)
    }

    async fn close(self) -> Result<()> {
        self.state.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Console fakes ────────────────────────────────────────────────────────────

pub const NEW_THEME_ID: &str = "T1";
pub const IMPORT_JOB_ID: &str = "job-import";
pub const EXPORT_JOB_ID: &str = "job-export";
pub const UPLOAD_URL: &str = "https://uploads.example.com/themes";
pub const TRACKING_URL: &str = "https://acme.zendesk.com/theming/upload-done";
pub const DOWNLOAD_URL: &str = "https://exports.example.com/theme.zip";

/// In-memory remote account behind every fake console.
#[derive(Default)]
pub struct Remote {
    pub themes: Mutex<Vec<ThemeInfo>>,
    /// Every remote call in order, as `name` or `name:arg`.
    pub calls: Mutex<Vec<String>>,
    /// Status replies; an `Err` is a remote rejection of the query.
    pub statuses: Mutex<VecDeque<std::result::Result<JobStatus, String>>>,
    pub fail_publish: AtomicBool,
    pub consoles_opened: AtomicUsize,
    pub consoles_closed: AtomicUsize,
    pub visits: Mutex<Vec<String>>,
}

impl Remote {
    pub fn with_themes(themes: Vec<ThemeInfo>) -> Arc<Self> {
        let remote = Self::default();
        *remote.themes.lock().unwrap() = themes;
        Arc::new(remote)
    }

    pub fn script_statuses(&self, statuses: Vec<std::result::Result<JobStatus, String>>) {
        *self.statuses.lock().unwrap() = statuses.into();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn themes(&self) -> Vec<ThemeInfo> {
        self.themes.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("getJobStatus"))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct FakeConsole {
    pub remote: Arc<Remote>,
}

impl ThemeConsole for FakeConsole {
    async fn list_themes(&self) -> Result<Vec<ThemeInfo>> {
        self.remote.record("listThemes".to_string());
        Ok(self.remote.themes())
    }

    async fn create_export_job(&self, theme_id: &str) -> Result<Job> {
        self.remote.record(format!("createExportThemeJob:{theme_id}"));
        Ok(Job::export(EXPORT_JOB_ID.to_string(), DOWNLOAD_URL.to_string()))
    }

    async fn create_import_job(&self) -> Result<Job> {
        self.remote.record("createImportThemeJob".to_string());
        self.remote
            .themes
            .lock()
            .unwrap()
            .push(theme(NEW_THEME_ID, false));
        let fields = UploadFields::new(vec![
            ("key".to_string(), "themes/T1.zip".to_string()),
            ("policy".to_string(), "abc".to_string()),
        ]);
        Ok(Job::import(
            IMPORT_JOB_ID.to_string(),
            NEW_THEME_ID.to_string(),
            UPLOAD_URL.to_string(),
            fields,
        ))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        self.remote.record(format!("getJobStatus:{job_id}"));
        match self.remote.statuses.lock().unwrap().pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(RemoteError::Operation {
                operation: "getJobStatus".to_string(),
                message,
            }
            .into()),
            None => Ok(JobStatus::Completed),
        }
    }

    async fn publish_theme(&self, theme_id: &str) -> Result<()> {
        self.remote.record(format!("publishTheme:{theme_id}"));
        if self.remote.fail_publish.load(Ordering::SeqCst) {
            return Err(RemoteError::Operation {
                operation: "publishTheme".to_string(),
                message: "theme is not valid".to_string(),
            }
            .into());
        }
        for t in self.remote.themes.lock().unwrap().iter_mut() {
            t.is_live = t.id == theme_id;
        }
        Ok(())
    }

    async fn archive_theme(&self, theme_id: &str) -> Result<()> {
        self.remote.record(format!("archiveTheme:{theme_id}"));
        self.remote.themes.lock().unwrap().retain(|t| t.id != theme_id);
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.remote.consoles_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeWorkbench {
    pub remote: Arc<Remote>,
}

impl Workbench for FakeWorkbench {
    type Console = FakeConsole;

    async fn open_console(&self) -> Result<FakeConsole> {
        self.remote.consoles_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConsole {
            remote: Arc::clone(&self.remote),
        })
    }

    async fn visit(&self, url: &str) -> Result<()> {
        self.remote.visits.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

// ── Transfer fakes ───────────────────────────────────────────────────────────

/// Records uploads and answers with [`TRACKING_URL`] and a 303, or a 403
/// when `rejects` is set.
#[derive(Default)]
pub struct RecordingUploader {
    pub uploads: Mutex<Vec<(String, Vec<(String, String)>, u64)>>,
    pub rejects: AtomicBool,
}

impl BlobUploader for RecordingUploader {
    async fn upload(
        &self,
        payload: UploadPayload,
        url: &str,
        fields: &UploadFields,
    ) -> Result<UploadReceipt> {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.uploads
            .lock()
            .unwrap()
            .push((url.to_string(), fields, payload.size()));
        let status = if self.rejects.load(Ordering::SeqCst) { 403 } else { 303 };
        Ok(UploadReceipt {
            tracking_url: TRACKING_URL.to_string(),
            status,
        })
    }
}

#[derive(Default)]
pub struct RecordingDownloader {
    pub downloads: Mutex<Vec<(String, PathBuf)>>,
}

impl ThemeDownloader for RecordingDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));
        Ok(dest.to_path_buf())
    }
}

/// Clock that records requested sleeps and returns immediately.
#[derive(Default)]
pub struct RecordingClock {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Clock that really waits on the tokio timer (for paused-time tests).
pub struct TimerClock;

impl Clock for TimerClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Reporter keeping every event as `step:`, `success:` or `warn:` lines.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn:").map(str::to_owned))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().unwrap().push(format!("step:{message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().unwrap().push(format!("success:{message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(format!("warn:{message}"));
    }
}

/// Write a small theme tree under `root`.
pub fn write_theme(root: &Path) {
    std::fs::create_dir_all(root.join("templates")).unwrap();
    std::fs::create_dir_all(root.join("assets").join("img")).unwrap();
    std::fs::write(root.join("manifest.json"), r#"{"name":"Acme"}"#).unwrap();
    std::fs::write(root.join("templates").join("home_page.hbs"), "<h1>{{t 'hi'}}</h1>").unwrap();
    std::fs::write(root.join("assets").join("img").join("logo.svg"), "<svg/>").unwrap();
}
