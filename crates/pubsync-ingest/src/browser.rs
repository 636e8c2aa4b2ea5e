//! Headless Chrome implementation of the fetch seam.
//!
//! One browser process per run ([`ChromeLauncher::open`]), one tab per
//! fetch attempt. Each tab is owned by a [`PageGuard`] so it is closed on
//! every exit path.

use chromiumoxide::{
  Browser, BrowserConfig, Page,
  cdp::browser_protocol::network::SetUserAgentOverrideParams,
};
use futures::StreamExt;
use tokio::{
  runtime::Handle,
  task::JoinHandle,
  time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::{
  fetch::{FetchError, FetcherFactory, ProfileFetcher},
  settings::BrowserSettings,
};

/// Flags for running inside containers and other sandbox-less hosts.
/// `--no-sandbox` is set through the builder.
const LAUNCH_ARGS: &[&str] = &[
  "--disable-setuid-sandbox",
  "--disable-dev-shm-usage",
  "--disable-accelerated-2d-canvas",
  "--no-first-run",
  "--no-zygote",
  "--disable-gpu",
];

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ─── Launcher ────────────────────────────────────────────────────────────────

pub struct ChromeLauncher {
  settings: BrowserSettings,
}

impl ChromeLauncher {
  pub fn new(settings: BrowserSettings) -> Self { Self { settings } }

  fn config(&self) -> Result<BrowserConfig, FetchError> {
    let mut builder = BrowserConfig::builder()
      .no_sandbox()
      .args(LAUNCH_ARGS.iter().copied())
      .request_timeout(self.settings.navigation_timeout());
    if let Some(executable) = &self.settings.executable {
      builder = builder.chrome_executable(executable);
    }
    builder.build().map_err(FetchError::Launch)
  }
}

impl FetcherFactory for ChromeLauncher {
  type Fetcher = ChromeFetcher;

  async fn open(&self) -> Result<ChromeFetcher, FetchError> {
    let (browser, mut handler) = Browser::launch(self.config()?)
      .await
      .map_err(|e| FetchError::Launch(e.to_string()))?;

    // The CDP connection only makes progress while its handler is polled.
    let handler = tokio::spawn(async move {
      while let Some(event) = handler.next().await {
        if let Err(e) = event {
          debug!(error = %e, "browser handler event error");
        }
      }
    });

    debug!("browser launched");
    Ok(ChromeFetcher { browser, handler, settings: self.settings.clone() })
  }

  async fn close(&self, mut fetcher: ChromeFetcher) {
    if let Err(e) = fetcher.browser.close().await {
      warn!(error = %e, "failed to close browser");
    }
    if let Err(e) = fetcher.browser.wait().await {
      warn!(error = %e, "failed to reap browser process");
    }
    debug!("browser closed");
  }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// A running browser shared by every fetch of one run.
pub struct ChromeFetcher {
  browser:  Browser,
  handler:  JoinHandle<()>,
  settings: BrowserSettings,
}

impl Drop for ChromeFetcher {
  fn drop(&mut self) { self.handler.abort(); }
}

impl ChromeFetcher {
  async fn render(&self, page: &Page, url: &str) -> Result<String, FetchError> {
    page
      .set_user_agent(SetUserAgentOverrideParams::new(
        self.settings.user_agent.clone(),
      ))
      .await
      .map_err(|e| FetchError::Navigation(e.to_string()))?;

    let limit = self.settings.navigation_timeout();
    match tokio::time::timeout(limit, page.goto(url)).await {
      Err(_) => return Err(FetchError::Timeout(limit)),
      Ok(Err(e)) => return Err(FetchError::Navigation(e.to_string())),
      Ok(Ok(_)) => {}
    }

    if !self.wait_until_ready(page).await {
      debug!(
        url,
        selector = %self.settings.ready_selector,
        "ready selector not seen, using page as is"
      );
    }

    page
      .content()
      .await
      .map_err(|e| FetchError::Navigation(e.to_string()))
  }

  /// Poll for the ready selector until it appears or the settle timeout
  /// elapses. Returns whether it appeared.
  async fn wait_until_ready(&self, page: &Page) -> bool {
    let deadline = Instant::now() + self.settings.settle_timeout();
    loop {
      if page
        .find_element(self.settings.ready_selector.as_str())
        .await
        .is_ok()
      {
        return true;
      }
      let now = Instant::now();
      if now >= deadline {
        return false;
      }
      tokio::time::sleep(READY_POLL_INTERVAL.min(deadline - now)).await;
    }
  }
}

impl ProfileFetcher for ChromeFetcher {
  async fn fetch_profile_html(&self, url: &str) -> Result<String, FetchError> {
    let page = self
      .browser
      .new_page("about:blank")
      .await
      .map_err(|e| FetchError::Navigation(e.to_string()))?;
    let guard = PageGuard::new(page, url);

    let html = self.render(guard.page(), url).await;
    guard.close().await;
    html
  }
}

// ─── Page guard ──────────────────────────────────────────────────────────────

/// Owns one browser tab.
///
/// [`close`](Self::close) is the normal path. If the guard is dropped
/// without it (an early return or a cancelled future), `Drop` spawns the
/// close onto the runtime instead.
struct PageGuard {
  page:    Page,
  url:     String,
  closed:  bool,
  runtime: Handle,
}

impl PageGuard {
  fn new(page: Page, url: &str) -> Self {
    Self { page, url: url.to_owned(), closed: false, runtime: Handle::current() }
  }

  fn page(&self) -> &Page { &self.page }

  async fn close(mut self) {
    self.closed = true;
    if let Err(e) = self.page.clone().close().await {
      warn!(url = %self.url, error = %e, "failed to close page");
    }
  }
}

impl Drop for PageGuard {
  fn drop(&mut self) {
    if self.closed {
      return;
    }
    let page = self.page.clone();
    let url = std::mem::take(&mut self.url);
    self.runtime.spawn(async move {
      if let Err(e) = page.close().await {
        warn!(url = %url, error = %e, "failed to close page on drop");
      }
    });
  }
}
