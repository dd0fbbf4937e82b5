//! Headless-browser retrieval of rendered page text.
//!
//! Each `fetch_text` call owns an isolated browser session: its own profile
//! directory, its own CDP handler task, its own interception rule. The
//! session is torn down on every exit path.

use crate::config::toml_config::FetchConfig;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
    FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct ChromeFetcher {
    config: FetchConfig,
}

impl ChromeFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// One navigate-wait-extract attempt on an already-open page.
    async fn attempt(&self, session: &BrowserSession, url: &str) -> Result<String> {
        let page = session.page();

        // commit only; JS-heavy pages may never settle into a quiet "load"
        bounded(self.config.nav_timeout_secs, "navigation", page.goto(url)).await?;
        self.wait_for_body(page).await?;

        // give client-side rendering time to populate the text
        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

        let body = page.find_element("body").await?;
        let text = body.inner_text().await?.unwrap_or_default();

        tracing::debug!("Fetched {} chars of rendered text from {}", text.len(), url);
        Ok(text)
    }

    /// `goto` returns once navigation is committed, before client-side
    /// rendering has produced a DOM. Poll until the body element exists.
    async fn wait_for_body(&self, page: &Page) -> Result<()> {
        let deadline = Duration::from_secs(self.config.element_timeout_secs);
        let start = Instant::now();

        loop {
            if page.find_element("body").await.is_ok() {
                return Ok(());
            }
            if start.elapsed() >= deadline {
                return Err(TrackerError::TimeoutError {
                    stage: "body element",
                    seconds: self.config.element_timeout_secs,
                });
            }
            tokio::time::sleep(BODY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let session = BrowserSession::launch(&self.config).await?;
        let session_ref = &session;

        let result = with_retries(
            url,
            self.config.retry_attempts,
            Duration::from_millis(self.config.retry_delay_ms),
            || self.attempt(session_ref, url),
        )
        .await;

        session.shutdown().await;
        result
    }
}

/// Runs `op` up to `attempts` times with a fixed delay between failures.
/// Exhaustion yields a fetch error carrying the last underlying cause.
async fn with_retries<T, F, Fut>(url: &str, attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                return Err(TrackerError::FetchError {
                    url: url.to_string(),
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                tracing::warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn bounded<T, F>(seconds: u64, stage: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, CdpError>>,
{
    match tokio::time::timeout(Duration::from_secs(seconds), fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TrackerError::TimeoutError { stage, seconds }),
    }
}

/// A launched browser with one intercepted page.
///
/// The CDP handler task MUST be aborted once the browser is gone, and the
/// profile directory removed only after the process has exited and released
/// its file handles.
struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    intercept_task: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserSession {
    async fn launch(config: &FetchConfig) -> Result<Self> {
        let chrome_path = find_browser_executable()?;
        let user_data_dir = session_profile_dir();
        std::fs::create_dir_all(&user_data_dir)?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(config.nav_timeout_secs))
            .window_size(1280, 1024)
            .user_data_dir(user_data_dir.clone())
            .chrome_executable(chrome_path)
            .arg("--disable-background-networking")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");
        builder = if config.headless {
            builder.headless_mode(HeadlessMode::default())
        } else {
            builder.with_head()
        };

        let browser_config = builder.build().map_err(|e| TrackerError::ConfigError {
            message: format!("Failed to build browser config: {}", e),
        })?;

        let (mut browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {:?}", e);
                }
            }
        });

        match Self::open_intercepted_page(&browser).await {
            Ok((page, intercept_task)) => Ok(Self {
                browser,
                page,
                handler_task,
                intercept_task,
                user_data_dir: Some(user_data_dir),
            }),
            Err(e) => {
                close_browser(&mut browser).await;
                handler_task.abort();
                remove_profile_dir(&user_data_dir);
                Err(e)
            }
        }
    }

    /// Opens a blank page and installs the interception rule: image and
    /// font requests are aborted before completing, everything else
    /// continues. Only text content is needed, so skipping media cuts the
    /// load time of heavy pages drastically.
    async fn open_intercepted_page(browser: &Browser) -> Result<(Page, JoinHandle<()>)> {
        let page = browser.new_page("about:blank").await?;

        let pattern = RequestPattern::builder().url_pattern("*").build();
        page.execute(FetchEnableParams::builder().pattern(pattern).build())
            .await?;

        let mut request_events = page.event_listener::<EventRequestPaused>().await?;
        let intercept_page = page.clone();
        let intercept_task = tokio::task::spawn(async move {
            while let Some(event) = request_events.next().await {
                let request_id = event.request_id.clone();
                let blocked = matches!(
                    event.resource_type,
                    ResourceType::Image | ResourceType::Font
                );

                let outcome = if blocked {
                    intercept_page
                        .execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                        .await
                        .map(|_| ())
                } else {
                    intercept_page
                        .execute(ContinueRequestParams::new(request_id))
                        .await
                        .map(|_| ())
                };

                if let Err(e) = outcome {
                    tracing::trace!("Request interception reply failed: {}", e);
                }
            }
        });

        Ok((page, intercept_task))
    }

    fn page(&self) -> &Page {
        &self.page
    }

    async fn shutdown(mut self) {
        close_browser(&mut self.browser).await;
        self.intercept_task.abort();
        self.handler_task.abort();
        if let Some(dir) = self.user_data_dir.take() {
            remove_profile_dir(&dir);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Browser::drop kills the Chrome process; the tasks and the profile
        // directory still need cleaning up if shutdown() never ran.
        self.intercept_task.abort();
        self.handler_task.abort();
        if let Some(dir) = self.user_data_dir.take() {
            let _ = std::fs::remove_dir_all(&dir);
        }
    }
}

async fn close_browser(browser: &mut Browser) {
    if let Err(e) = browser.close().await {
        tracing::debug!("Browser close failed: {}", e);
    }
    if let Err(e) = browser.wait().await {
        tracing::debug!("Browser wait failed: {}", e);
    }
}

fn remove_profile_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        tracing::warn!("Failed to remove profile dir {}: {}", dir.display(), e);
    }
}

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn session_profile_dir() -> PathBuf {
    std::env::temp_dir().join(format!(
        "volume_tracker_chrome_{}_{}",
        std::process::id(),
        SESSION_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Find a Chrome/Chromium executable: the CHROMIUM_PATH environment variable
/// first, then common installation paths, then `which` on unix systems.
fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
        ]
    };

    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path_str.is_empty() {
                        return Ok(PathBuf::from(path_str));
                    }
                }
            }
        }
    }

    Err(TrackerError::ConfigError {
        message: "Chrome/Chromium executable not found; install it or set CHROMIUM_PATH"
            .to_string(),
    })
}
