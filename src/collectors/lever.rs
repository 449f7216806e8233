use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{
    AtsStrategy, CandidateCard, CandidateRecord, locate_with, title_or_anchor_text,
};
use crate::error::AppError;
use crate::extract::field::{extract_field, extract_link};
use crate::extract::locator::{Cascade, Locator};
use crate::page::PageHandle;

const SETTLE_DELAY: Duration = Duration::from_secs(3);

const CARDS: Cascade = Cascade::new(
    "lever-cards",
    &[
        Locator::css(".posting"),
        Locator::css("a[class*='posting-title']"),
    ],
);

const TITLE: Cascade = Cascade::new(
    "lever-title",
    &[
        Locator::css("[data-qa='posting-name']"),
        Locator::css(".posting-title h5"),
        Locator::css(".posting-title"),
    ],
);

const LOCATION: Cascade = Cascade::new(
    "lever-location",
    &[
        Locator::css(".posting-categories .location"),
        Locator::css(".sort-by-location"),
        Locator::css(".location"),
    ],
);

const LINK: Cascade = Cascade::new("lever-link", &[Locator::css("a.posting-title")]);

/// Lever hosted boards (`jobs.lever.co`) and embeds of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lever;

#[async_trait(?Send)]
impl AtsStrategy for Lever {
    fn name(&self) -> &'static str {
        "lever"
    }

    fn settle_delay(&self) -> Duration {
        SETTLE_DELAY
    }

    async fn locate_cards<P: PageHandle>(
        &self,
        page: &P,
        attempt_timeout: Duration,
    ) -> Vec<CandidateCard<P::Element>> {
        let cards = locate_with(page, &CARDS, attempt_timeout).await;
        tracing::info!("Found {} Lever job postings", cards.len());
        cards
    }

    async fn extract_record<P: PageHandle>(
        &self,
        page: &P,
        card: &CandidateCard<P::Element>,
    ) -> Result<Option<CandidateRecord>, AppError> {
        let Some(title) = title_or_anchor_text(page, &card.element, &TITLE).await? else {
            return Ok(None);
        };
        let location = extract_field(page, &card.element, &LOCATION).await?;
        let url = extract_link(page, &card.element, &LINK).await;
        Ok(Some(CandidateRecord {
            title,
            location,
            url,
        }))
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;
    use url::Url;

    use super::*;
    use crate::page::StaticPage;

    fn page(document: &Html) -> StaticPage<'_> {
        StaticPage::new(document, Url::parse("https://jobs.lever.co/groundswell").unwrap())
    }

    #[tokio::test]
    async fn reads_posting_blocks() {
        let document = Html::parse_document(
            r#"<div class="postings-group">
                 <div class="posting" data-qa-posting-id="abc">
                   <div class="posting-apply"><a class="posting-btn-submit" href="https://jobs.lever.co/groundswell/abc/apply">Apply</a></div>
                   <a class="posting-title" href="https://jobs.lever.co/groundswell/abc">
                     <h5 data-qa="posting-name">Salesforce Developer</h5>
                     <div class="posting-categories">
                       <span class="sort-by-location posting-category small-category-label location">Washington, DC</span>
                       <span class="sort-by-team posting-category">Engineering</span>
                     </div>
                   </a>
                 </div>
               </div>"#,
        );
        let page = page(&document);

        let cards = Lever.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].locator, Locator::css(".posting"));

        let record = Lever.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Salesforce Developer");
        assert_eq!(record.location.unwrap().text, "Washington, DC");
        assert_eq!(record.url, "https://jobs.lever.co/groundswell/abc");
    }

    #[tokio::test]
    async fn falls_back_to_title_anchors() {
        let document = Html::parse_document(
            r#"<div class="list">
                 <a class="posting-title-link" href="/groundswell/def">Data Scientist</a>
               </div>"#,
        );
        let page = page(&document);

        let cards = Lever.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].locator, Locator::css("a[class*='posting-title']"));

        let record = Lever.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Data Scientist");
        assert_eq!(record.url, "https://jobs.lever.co/groundswell/def");
    }
}
