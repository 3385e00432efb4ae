use crate::error::{Result, ScoutError};
use crate::scrapers::traits::PageSource;
use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Page source backed by a headless Chrome instance.
/// The browser process is shut down when this is dropped.
pub struct ChromePageSource {
    browser: Arc<Browser>,
}

/// Slack on top of the navigation timeout before an idle CDP connection is dropped
const IDLE_MARGIN: Duration = Duration::from_secs(30);

/// Idle-connection timeout for the browser. Has to outlive the navigation
/// timeout, otherwise a slow page kills the websocket mid-navigation.
fn idle_browser_timeout(navigation_timeout: Duration) -> Duration {
    navigation_timeout.max(Duration::from_secs(30)) + IDLE_MARGIN
}

impl ChromePageSource {
    /// Launch a browser, optionally with a visible window for debugging selectors
    pub fn launch(headless: bool, navigation_timeout: Duration) -> anyhow::Result<Self> {
        info!("Launching Chrome (headless: {})...", headless);

        let options = LaunchOptions::default_builder()
            .headless(headless)
            .idle_browser_timeout(idle_browser_timeout(navigation_timeout))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser: Arc::new(browser),
        })
    }
}

/// Closes the tab however rendering ends
struct TabGuard(Arc<Tab>);

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(false) {
            warn!("Failed to close tab: {}", e);
        }
    }
}

fn render(browser: &Browser, url: &str, timeout: Duration) -> anyhow::Result<String> {
    let tab = TabGuard(browser.new_tab().context("Failed to open tab")?);
    tab.0.set_default_timeout(timeout);

    let started = Instant::now();
    tab.0.navigate_to(url)?;
    tab.0.wait_until_navigated()?;
    debug!("Navigated to {} in {:?}", url, started.elapsed());

    let html_result = tab.0.evaluate("document.documentElement.outerHTML", false)?;
    let html = html_result
        .value
        .and_then(|value| value.as_str().map(str::to_string))
        .context("Page returned no HTML")?;

    Ok(html)
}

#[async_trait]
impl PageSource for ChromePageSource {
    async fn load_page(&self, url: &str, timeout: Duration) -> Result<String> {
        info!("Opening {} (timeout {:?})", url, timeout);

        let browser = Arc::clone(&self.browser);
        let target = url.to_string();
        let rendered = tokio::task::spawn_blocking(move || render(&browser, &target, timeout))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|inner| inner);

        match rendered {
            Ok(html) => {
                debug!("Captured {} bytes of HTML", html.len());
                Ok(html)
            }
            Err(source) => Err(ScoutError::Navigation {
                url: url.to_string(),
                source,
            }),
        }
    }

    fn source_name(&self) -> &'static str {
        "headless-chrome"
    }
}
