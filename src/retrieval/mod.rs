// Retrieval module.
// Fetches raw material for the extraction engine: static HTML, JSON feeds,
// robots.txt verdicts and rendered browser pages.

pub mod browser;
pub mod http_client;
pub mod robots;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::AppError;
use crate::page::{LivePage, PageHandle};

pub use browser::{ChromiumLauncher, ChromiumSession};
pub use http_client::HttpRetriever;

/// A listing page as served over plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the body was finally served from, after redirects.
    pub url: Url,
    pub body: String,
}

/// Plain HTTP side of retrieval.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Body of a listing page, as served (no script execution).
    async fn fetch_static(&self, url: &Url) -> Result<FetchedPage, AppError>;

    /// A JSON feed, parsed.
    async fn fetch_json(&self, url: &Url) -> Result<Value, AppError>;

    /// Whether the site's robots.txt lets agent `*` fetch `url`. Never fails:
    /// an unreachable or unreadable robots.txt allows everything.
    async fn robots_allowed(&self, url: &Url) -> bool;
}

/// Acquires a rendering session for one site pass.
#[async_trait(?Send)]
pub trait BrowserLauncher {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, AppError>;
}

/// A running browser. Must be closed by whoever launched it.
#[async_trait(?Send)]
pub trait BrowserSession: Sized {
    type Page: PageHandle;

    /// Load `url` and wait `settle` for client-side rendering before handing
    /// the page out.
    async fn open(&mut self, url: &Url, settle: Duration) -> Result<Self::Page, AppError>;

    async fn close(self) -> Result<(), AppError>;
}

/// Launcher for runs without a browser. Every launch fails, so rendered sites
/// end as soft failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowser;

/// Uninhabited: [`NoBrowser`] never produces a session.
#[derive(Debug)]
pub enum NoSession {}

#[async_trait(?Send)]
impl BrowserLauncher for NoBrowser {
    type Session = NoSession;

    async fn launch(&self) -> Result<NoSession, AppError> {
        Err(AppError::Retrieval(
            "browser rendering is disabled for this run".to_string(),
        ))
    }
}

#[async_trait(?Send)]
impl BrowserSession for NoSession {
    type Page = LivePage;

    async fn open(&mut self, _url: &Url, _settle: Duration) -> Result<LivePage, AppError> {
        match *self {}
    }

    async fn close(self) -> Result<(), AppError> {
        match self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_browser_never_launches() {
        let err = NoBrowser.launch().await.unwrap_err();
        assert!(err.is_retrieval());
    }
}
