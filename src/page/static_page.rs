use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::error::AppError;
use crate::extract::locator::Locator;
use crate::page::PageHandle;

/// Elements that start a new line when rendering text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot",
    "th", "thead", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Page handle over a parsed HTML document. Queries are synchronous.
pub struct StaticPage<'a> {
    document: &'a Html,
    url: Url,
    base: Url,
}

impl<'a> StaticPage<'a> {
    /// `url` is where the document was served from.
    pub fn new(document: &'a Html, url: Url) -> Self {
        let base = declared_base(document, &url).unwrap_or_else(|| url.clone());
        StaticPage {
            document,
            url,
            base,
        }
    }

    fn select_all(
        &self,
        selector: &Selector,
        root: Option<&ElementRef<'a>>,
    ) -> Vec<ElementRef<'a>> {
        match root {
            Some(root) => root.select(selector).collect(),
            None => self.document.select(selector).collect(),
        }
    }
}

/// The first `<base href>`, resolved against the serving URL.
fn declared_base(document: &Html, url: &Url) -> Option<Url> {
    let selector = Selector::parse("base[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    url.join(href.trim()).ok()
}

fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector).map_err(|e| AppError::InvalidLocator {
        locator: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Text roughly as a browser's `innerText` would lay it out: whitespace inside
/// text nodes collapsed, one line per block element.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let mut words = text.split_whitespace().peekable();
                if words.peek().is_none() {
                    if !text.is_empty() && !out.ends_with([' ', '\n']) {
                        out.push(' ');
                    }
                    continue;
                }
                if text.starts_with(char::is_whitespace) && !out.ends_with([' ', '\n']) {
                    out.push(' ');
                }
                out.push_str(&words.collect::<Vec<_>>().join(" "));
                if text.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    push_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[async_trait(?Send)]
impl<'a> PageHandle for StaticPage<'a> {
    type Element = ElementRef<'a>;

    fn url(&self) -> &Url {
        &self.url
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    async fn query(
        &self,
        locator: &Locator,
        root: Option<&ElementRef<'a>>,
    ) -> Result<Vec<ElementRef<'a>>, AppError> {
        match locator {
            Locator::Css(selector) => {
                let selector = parse_selector(selector)?;
                Ok(self.select_all(&selector, root))
            }
            Locator::Has { outer, inner } => {
                let outer = parse_selector(outer)?;
                let inner = parse_selector(inner)?;
                Ok(self
                    .select_all(&outer, root)
                    .into_iter()
                    .filter(|el| el.select(&inner).next().is_some())
                    .collect())
            }
        }
    }

    async fn read_text(&self, element: &ElementRef<'a>) -> Result<String, AppError> {
        Ok(element_text(*element))
    }

    async fn read_attribute(
        &self,
        element: &ElementRef<'a>,
        name: &str,
    ) -> Result<Option<String>, AppError> {
        Ok(element.value().attr(name).map(str::to_string))
    }

    async fn tag_name(&self, element: &ElementRef<'a>) -> Result<String, AppError> {
        Ok(element.value().name().to_ascii_lowercase())
    }
}
