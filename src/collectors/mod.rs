// Collector module.
// Defines the per-platform extraction strategies and the site runner.

pub mod generic;
pub mod greenhouse;
pub mod lever;
pub mod runner;
pub mod smartrecruiters;
pub mod workday;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::extract::cascade::resolve;
use crate::extract::field::{RawField, extract_field};
use crate::extract::locator::{Cascade, Locator};
use crate::models::site::PlatformType;
use crate::page::PageHandle;

pub use generic::Generic;
pub use greenhouse::Greenhouse;
pub use lever::Lever;
pub use smartrecruiters::SmartRecruiters;
pub use workday::Workday;

/// One matched job card and the locator that found it.
#[derive(Debug, Clone)]
pub struct CandidateCard<E> {
    pub element: E,
    pub locator: Locator,
}

/// Fields pulled from one card (or one feed entry), not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub title: RawField,
    pub location: Option<RawField>,
    pub url: String,
}

/// Trait that every DOM-based platform strategy implements.
/// A strategy owns its locator cascades and its card-to-record mapping.
#[async_trait(?Send)]
pub trait AtsStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// How long a rendered page is left to settle before the first query.
    fn settle_delay(&self) -> Duration;

    /// Find the job cards on the page, in document order.
    async fn locate_cards<P: PageHandle>(
        &self,
        page: &P,
        attempt_timeout: Duration,
    ) -> Vec<CandidateCard<P::Element>>;

    /// Build a candidate record from one card. `Ok(None)` means the card has
    /// no title and contributes nothing.
    async fn extract_record<P: PageHandle>(
        &self,
        page: &P,
        card: &CandidateCard<P::Element>,
    ) -> Result<Option<CandidateRecord>, AppError>;
}

/// Closed set of DOM strategies, selected by the site's platform type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Workday(Workday),
    Greenhouse(Greenhouse),
    Lever(Lever),
    Generic(Generic),
}

impl Strategy {
    /// The DOM strategy for a platform. The API platform has none: it is read
    /// from a JSON feed by [`SmartRecruiters`].
    pub fn for_platform(platform: PlatformType) -> Option<Self> {
        match platform {
            PlatformType::Workday => Some(Strategy::Workday(Workday)),
            PlatformType::Greenhouse => Some(Strategy::Greenhouse(Greenhouse)),
            PlatformType::Lever => Some(Strategy::Lever(Lever)),
            PlatformType::Generic => Some(Strategy::Generic(Generic)),
            PlatformType::Api => None,
        }
    }
}

#[async_trait(?Send)]
impl AtsStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Workday(s) => s.name(),
            Strategy::Greenhouse(s) => s.name(),
            Strategy::Lever(s) => s.name(),
            Strategy::Generic(s) => s.name(),
        }
    }

    fn settle_delay(&self) -> Duration {
        match self {
            Strategy::Workday(s) => s.settle_delay(),
            Strategy::Greenhouse(s) => s.settle_delay(),
            Strategy::Lever(s) => s.settle_delay(),
            Strategy::Generic(s) => s.settle_delay(),
        }
    }

    async fn locate_cards<P: PageHandle>(
        &self,
        page: &P,
        attempt_timeout: Duration,
    ) -> Vec<CandidateCard<P::Element>> {
        match self {
            Strategy::Workday(s) => s.locate_cards(page, attempt_timeout).await,
            Strategy::Greenhouse(s) => s.locate_cards(page, attempt_timeout).await,
            Strategy::Lever(s) => s.locate_cards(page, attempt_timeout).await,
            Strategy::Generic(s) => s.locate_cards(page, attempt_timeout).await,
        }
    }

    async fn extract_record<P: PageHandle>(
        &self,
        page: &P,
        card: &CandidateCard<P::Element>,
    ) -> Result<Option<CandidateRecord>, AppError> {
        match self {
            Strategy::Workday(s) => s.extract_record(page, card).await,
            Strategy::Greenhouse(s) => s.extract_record(page, card).await,
            Strategy::Lever(s) => s.extract_record(page, card).await,
            Strategy::Generic(s) => s.extract_record(page, card).await,
        }
    }
}

/// Resolve a card cascade over the whole page and tag each match with the
/// locator that found it.
pub(crate) async fn locate_with<P: PageHandle>(
    page: &P,
    cascade: &Cascade,
    attempt_timeout: Duration,
) -> Vec<CandidateCard<P::Element>> {
    let resolution = resolve(page, None, cascade, Some(attempt_timeout)).await;
    match resolution.locator {
        Some(locator) => resolution
            .matches
            .into_iter()
            .map(|element| CandidateCard { element, locator })
            .collect(),
        None => Vec::new(),
    }
}

/// Title from `cascade`, or the card's own text when the card is itself the
/// title anchor (cascades whose last resort matches the link directly).
pub(crate) async fn title_or_anchor_text<P: PageHandle>(
    page: &P,
    card: &P::Element,
    cascade: &Cascade,
) -> Result<Option<RawField>, AppError> {
    if let Some(title) = extract_field(page, card, cascade).await? {
        return Ok(Some(title));
    }
    if page.tag_name(card).await? == "a" {
        let text = page.read_text(card).await?;
        return Ok(Some(RawField::from_card_text(&text)));
    }
    Ok(None)
}
