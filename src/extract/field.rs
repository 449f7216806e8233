use url::Url;

use crate::error::AppError;
use crate::extract::cascade::resolve;
use crate::extract::locator::{Cascade, Locator};
use crate::extract::normalize::normalize;
use crate::page::PageHandle;

const ANY_LINK: Cascade = Cascade::new("any-link", &[Locator::css("a[href]")]);

/// Where a field value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    Locator(Locator),
    /// The card's own text, used when no field locator matched.
    CardText,
    /// A named field of a structured feed entry.
    Feed(&'static str),
}

/// Unvalidated, normalized field text pulled from one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub text: String,
    pub source: FieldSource,
}

impl RawField {
    pub fn from_card_text(text: &str) -> Self {
        RawField {
            text: normalize(text),
            source: FieldSource::CardText,
        }
    }
}

/// Resolve `cascade` inside `card` and return the normalized text of the first
/// matched element. `None` when no locator matched; callers decide defaults.
pub async fn extract_field<P: PageHandle>(
    page: &P,
    card: &P::Element,
    cascade: &Cascade,
) -> Result<Option<RawField>, AppError> {
    let resolution = resolve(page, Some(card), cascade, None).await;
    let (Some(first), Some(locator)) = (resolution.matches.first(), resolution.locator) else {
        return Ok(None);
    };
    let text = page.read_text(first).await?;
    Ok(Some(RawField {
        text: normalize(&text),
        source: FieldSource::Locator(locator),
    }))
}

/// Absolute link for a card. Checks the card itself when it is an anchor, then
/// `preferred`, then any anchor in the card, and finally falls back to the
/// listing URL so a record always has a link.
pub async fn extract_link<P: PageHandle>(page: &P, card: &P::Element, preferred: &Cascade) -> String {
    match find_link(page, card, preferred).await {
        Ok(Some(url)) => url,
        Ok(None) => page.url().to_string(),
        Err(e) => {
            tracing::debug!("link lookup failed, using listing url: {e}");
            page.url().to_string()
        }
    }
}

async fn find_link<P: PageHandle>(
    page: &P,
    card: &P::Element,
    preferred: &Cascade,
) -> Result<Option<String>, AppError> {
    if page.tag_name(card).await? == "a"
        && let Some(href) = page.read_attribute(card, "href").await?
        && let Some(url) = absolutize(page.base_url(), &href)
    {
        return Ok(Some(url));
    }

    for cascade in [preferred, &ANY_LINK] {
        let resolution = resolve(page, Some(card), cascade, None).await;
        for element in &resolution.matches {
            if let Some(href) = page.read_attribute(element, "href").await?
                && let Some(url) = absolutize(page.base_url(), &href)
            {
                return Ok(Some(url));
            }
        }
    }
    Ok(None)
}

/// Resolve `href` against the page's link base. Script, mail and fragment-only
/// links are not job links.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
    {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
