use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::error::AppError;
use crate::retrieval::{FetchedPage, Retriever};
use crate::retrieval::robots::{RobotsRules, robots_url};

/// Statuses worth another attempt.
const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

const ROBOTS_AGENT: &str = "*";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each further retry.
    pub backoff: Duration,
}

/// `reqwest` client sending browser-like headers, with retry and backoff.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: reqwest::Client,
    settings: HttpSettings,
}

impl HttpRetriever {
    pub fn new(settings: HttpSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(browser_headers())
            .timeout(settings.timeout)
            .build()?;
        Ok(HttpRetriever { client, settings })
    }

    /// GET `url`, retrying transport errors and retryable statuses. The final
    /// response must be a success.
    async fn get(&self, url: &Url) -> Result<reqwest::Response, AppError> {
        let mut attempt = 0;
        loop {
            let outcome = self.client.get(url.clone()).send().await;
            let retry_reason = match &outcome {
                Ok(resp) if RETRY_STATUSES.contains(&resp.status()) => {
                    Some(format!("status {}", resp.status()))
                }
                Ok(_) => None,
                Err(e) => Some(e.to_string()),
            };

            match retry_reason {
                Some(reason) if attempt < self.settings.max_retries => {
                    let wait = self.settings.backoff * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    tracing::debug!(
                        "GET {url} failed ({reason}), retry {attempt}/{} in {wait:?}",
                        self.settings.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                _ => {
                    let resp = outcome?;
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(AppError::Retrieval(format!("GET {url} returned {status}")));
                    }
                    return Ok(resp);
                }
            }
        }
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn fetch_static(&self, url: &Url) -> Result<FetchedPage, AppError> {
        let resp = self.get(url).await?;
        let final_url = resp.url().clone();
        if final_url != *url {
            tracing::debug!("{url} redirected to {final_url}");
        }
        Ok(FetchedPage {
            url: final_url,
            body: resp.text().await?,
        })
    }

    async fn fetch_json(&self, url: &Url) -> Result<Value, AppError> {
        let resp = self.get(url).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn robots_allowed(&self, url: &Url) -> bool {
        let Some(robots) = robots_url(url) else {
            return true;
        };
        let text = match self.get(&robots).await {
            Ok(resp) => match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Could not read robots.txt from {robots}: {e}");
                    return true;
                }
            },
            Err(e) => {
                tracing::warn!("Could not fetch robots.txt from {robots}: {e}");
                return true;
            }
        };

        let allowed = RobotsRules::parse(&text).allows_url(ROBOTS_AGENT, url);
        if !allowed {
            tracing::warn!("robots.txt forbids fetching {}", url.path());
        }
        allowed
    }
}
