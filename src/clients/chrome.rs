//! Chrome/Chromium sessions over the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig, HeadlessMode};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::browser::{BrowserError, BrowserSession, SessionLauncher};
use crate::config::BrowserConfig;
use crate::constants::browser::{BASE_ARGS, POLL_INTERVAL};

pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    #[must_use]
    pub const fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn build_config(&self) -> Result<CdpConfig, BrowserError> {
        let mut builder = CdpConfig::builder()
            .request_timeout(Duration::from_secs(self.config.request_timeout_seconds))
            .window_size(self.config.window_width, self.config.window_height);

        builder = if self.config.headless {
            builder.headless_mode(HeadlessMode::New)
        } else {
            builder.with_head()
        };

        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        for arg in BASE_ARGS {
            builder = builder.arg(*arg);
        }
        builder = builder.arg(format!("--lang={}", self.config.lang));
        for arg in &self.config.extra_args {
            builder = builder.arg(arg.as_str());
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession, BrowserError> {
        info!(headless = self.config.headless, lang = %self.config.lang, "Launching browser");

        let config = self.build_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
            debug!("Browser event handler task completed");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(BrowserError::Launch(format!("Failed to open page: {e}")));
            }
        };

        Ok(ChromeSession {
            browser,
            handler,
            page,
            closed: false,
        })
    }
}

/// A launched browser with one working tab.
///
/// Dropping the session aborts the DevTools event loop; `quit` closes the
/// browser process gracefully first.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    closed: bool,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::classify(e.to_string(), BrowserError::Navigation))?;
        Ok(())
    }

    async fn wait_for_elements(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Element>, BrowserError> {
        let page = &self.page;
        poll_for_elements(selector, timeout, move || async move {
            page.find_elements(selector)
                .await
                .map_err(|e| BrowserError::classify(e.to_string(), BrowserError::Extraction))
        })
        .await
    }

    async fn find_child(
        &self,
        element: &Element,
        selector: &str,
    ) -> Result<Option<Element>, BrowserError> {
        let children = element
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::classify(e.to_string(), BrowserError::Extraction))?;
        Ok(children.into_iter().next())
    }

    async fn get_attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        element
            .attribute(name)
            .await
            .map_err(|e| BrowserError::classify(e.to_string(), BrowserError::Extraction))
    }

    async fn quit(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser process to exit: {}", e);
        }
        self.handler.abort();

        match result {
            Ok(_) => {
                info!("Browser closed");
                Ok(())
            }
            Err(e) => {
                error!("Failed to close browser: {}", e);
                Err(BrowserError::SessionLost(e.to_string()))
            }
        }
    }
}

/// Calls `probe` every `POLL_INTERVAL` until it returns elements.
///
/// Each call only gets the time left before `timeout`, so a stalled DevTools
/// request cannot stretch the wait. Errors other than a lost session count as
/// "not there yet".
async fn poll_for_elements<T, F, Fut>(
    selector: &str,
    timeout: Duration,
    mut probe: F,
) -> Result<Vec<T>, BrowserError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BrowserError>>,
{
    let start = Instant::now();
    let timed_out = || BrowserError::Timeout(timeout, selector.to_string());

    loop {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        match tokio::time::timeout(remaining, probe()).await {
            Err(_) => return Err(timed_out()),
            Ok(Ok(elements)) if !elements.is_empty() => {
                debug!(
                    "Found {} elements for '{}' after {:?}",
                    elements.len(),
                    selector,
                    start.elapsed()
                );
                return Ok(elements);
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.is_session_lost() => return Err(e),
            Ok(Err(e)) => debug!("Polling '{}' failed: {}", selector, e),
        }

        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(timed_out());
        }
        tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser session dropped without quit - aborting handler task");
        }
        self.handler.abort();
    }
}
