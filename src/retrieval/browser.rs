use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::AppError;
use crate::page::LivePage;
use crate::retrieval::{BrowserLauncher, BrowserSession};

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub user_agent: String,
    /// Chromium executable; chromiumoxide looks one up when `None`.
    pub chrome_path: Option<PathBuf>,
}

/// Launches one headless Chromium per site pass.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        ChromiumLauncher { settings }
    }

    fn config(&self) -> Result<BrowserConfig, AppError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--window-size=1920,1080")
            .arg(format!("--user-agent={}", self.settings.user_agent));
        if let Some(path) = &self.settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| AppError::Retrieval(format!("failed to build browser config: {e}")))
    }
}

#[async_trait(?Send)]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession, AppError> {
        let (browser, mut handler) = Browser::launch(self.config()?)
            .await
            .map_err(|e| AppError::Retrieval(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler event error: {e}");
                }
            }
        });

        Ok(ChromiumSession { browser, handler })
    }
}

/// A running Chromium and the task driving its CDP connection.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

#[async_trait(?Send)]
impl BrowserSession for ChromiumSession {
    type Page = LivePage;

    async fn open(&mut self, url: &Url, settle: Duration) -> Result<LivePage, AppError> {
        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| AppError::Retrieval(format!("failed to open {url}: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| AppError::Retrieval(format!("navigation to {url} failed: {e}")))?;

        tokio::time::sleep(settle).await;
        Ok(LivePage::attach(page, url.clone()).await)
    }

    async fn close(mut self) -> Result<(), AppError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Retrieval(format!("failed to close browser: {e}")));
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        closed
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
