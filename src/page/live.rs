use async_trait::async_trait;
use chromiumoxide::page::Page;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::AppError;
use crate::extract::locator::Locator;
use crate::page::PageHandle;

/// Page-side array holding every element handed out by a query, so that later
/// calls can refer to them by index. It lives as long as the document and only
/// grows; a `LivePage` is used for one site pass and then dropped with its tab.
const REGISTRY: &str = "window.__jobharvest";

/// Where the tab landed and what the document resolves relative links against.
const LOCATION_SCRIPT: &str = "(() => { window.__jobharvest = []; \
    return [String(location.href), String(document.baseURI)]; })()";

/// Index into the in-page element registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveElement(usize);

/// Page handle over a rendered browser tab. Content may still be arriving, so
/// the cascade resolver polls queries against it.
pub struct LivePage {
    page: Page,
    url: Url,
    base: Url,
}

impl LivePage {
    /// Wrap a tab that finished navigating to `requested`. The tab's own
    /// location and `document.baseURI` take over from `requested`, so links
    /// resolve against the page that actually loaded.
    pub async fn attach(page: Page, requested: Url) -> Self {
        let mut live = LivePage {
            page,
            url: requested.clone(),
            base: requested,
        };
        match live.eval::<Vec<String>>(LOCATION_SCRIPT.to_string()).await {
            Ok(reported) => {
                live.url = reported_url(&live.url, reported.first().map(String::as_str));
                live.base = reported_url(&live.url, reported.get(1).map(String::as_str));
                if live.base != live.url {
                    tracing::debug!("{} resolves links against {}", live.url, live.base);
                }
            }
            Err(e) => tracing::debug!("could not read location of {}: {e}", live.url),
        }
        live
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, AppError> {
        let result = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| AppError::Page(format!("script evaluation failed: {e}")))?;
        result
            .into_value()
            .map_err(|e| AppError::Page(format!("unexpected script result: {e:?}")))
    }
}

/// A URL reported by the page, or `fallback` when it is missing or not a web
/// URL (`about:blank`, `data:`).
fn reported_url(fallback: &Url, reported: Option<&str>) -> Url {
    reported
        .and_then(|raw| Url::parse(raw).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or_else(|| fallback.clone())
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn root_expr(root: Option<&LiveElement>) -> String {
    match root {
        Some(LiveElement(idx)) => format!("({REGISTRY} || [])[{idx}]"),
        None => "document".to_string(),
    }
}

fn query_script(locator: &Locator, root: Option<&LiveElement>) -> String {
    let (outer, filter) = match locator {
        Locator::Css(selector) => (js_string(selector), String::new()),
        Locator::Has { outer, inner } => (
            js_string(outer),
            format!(".filter(el => el.querySelector({}) !== null)", js_string(inner)),
        ),
    };
    format!(
        "(() => {{
            {REGISTRY} = {REGISTRY} || [];
            const root = {root};
            if (!root) return [];
            return Array.from(root.querySelectorAll({outer})){filter}
                .map(el => {REGISTRY}.push(el) - 1);
        }})()",
        root = root_expr(root),
    )
}

fn element_script(element: &LiveElement, body: &str) -> String {
    format!(
        "(() => {{ const el = ({REGISTRY} || [])[{idx}]; if (!el) return null; {body} }})()",
        idx = element.0,
    )
}

#[async_trait(?Send)]
impl PageHandle for LivePage {
    type Element = LiveElement;

    fn url(&self) -> &Url {
        &self.url
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn query(
        &self,
        locator: &Locator,
        root: Option<&LiveElement>,
    ) -> Result<Vec<LiveElement>, AppError> {
        let indices: Vec<usize> = self.eval(query_script(locator, root)).await?;
        Ok(indices.into_iter().map(LiveElement).collect())
    }

    async fn read_text(&self, element: &LiveElement) -> Result<String, AppError> {
        let text: Option<String> = self
            .eval(element_script(
                element,
                "return el.innerText || el.textContent || '';",
            ))
            .await?;
        text.ok_or_else(|| AppError::Page("stale element handle".to_string()))
    }

    async fn read_attribute(
        &self,
        element: &LiveElement,
        name: &str,
    ) -> Result<Option<String>, AppError> {
        self.eval(element_script(
            element,
            &format!("return el.getAttribute({});", js_string(name)),
        ))
        .await
    }

    async fn tag_name(&self, element: &LiveElement) -> Result<String, AppError> {
        let tag: Option<String> = self
            .eval(element_script(element, "return el.tagName.toLowerCase();"))
            .await?;
        tag.ok_or_else(|| AppError::Page("stale element handle".to_string()))
    }
}
