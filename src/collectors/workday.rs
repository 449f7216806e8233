use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{
    AtsStrategy, CandidateCard, CandidateRecord, locate_with, title_or_anchor_text,
};
use crate::error::AppError;
use crate::extract::field::{extract_field, extract_link};
use crate::extract::locator::{Cascade, Locator};
use crate::page::PageHandle;

// Workday injects the job list after load with no usable ready signal.
const SETTLE_DELAY: Duration = Duration::from_secs(5);

const CARDS: Cascade = Cascade::new(
    "workday-cards",
    &[
        Locator::css("li[data-automation-id='jobItem']"),
        Locator::css("div[data-automation-id='jobItem']"),
        Locator::css("[role='listitem'] a[data-automation-id='jobTitle']"),
    ],
);

const TITLE: Cascade = Cascade::new(
    "workday-title",
    &[Locator::css("[data-automation-id='jobTitle']")],
);

const LOCATION: Cascade = Cascade::new(
    "workday-location",
    &[
        Locator::css("[data-automation-id='locations'] dd"),
        Locator::css("[data-automation-id='location']"),
        Locator::css("[data-automation-id='locations']"),
    ],
);

const LINK: Cascade = Cascade::new(
    "workday-link",
    &[Locator::css("a[data-automation-id='jobTitle']")],
);

/// Workday career sites (`*.myworkdayjobs.com`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workday;

#[async_trait(?Send)]
impl AtsStrategy for Workday {
    fn name(&self) -> &'static str {
        "workday"
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
        tracing::info!("Found {} Workday job items", cards.len());
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

    const LISTING: &str = r#"
        <ul role="list">
          <li class="css-1q2dra3" data-automation-id="jobItem">
            <h3><a data-automation-id="jobTitle" href="/en-US/External/job/Reston-VA/Data-Engineer_R123">Data Engineer</a></h3>
            <div data-automation-id="locations"><dl><dt>locations</dt><dd>Reston, VA</dd></dl></div>
            <div data-automation-id="postedOn"><dl><dt>posted on</dt><dd>Posted Today</dd></dl></div>
          </li>
          <li data-automation-id="jobItem">
            <h3><a data-automation-id="jobTitle" href="/en-US/External/job/Remote/Claims-Adjuster_R456">Claims Adjuster</a></h3>
          </li>
          <li data-automation-id="jobItem"><span>Promoted content</span></li>
        </ul>"#;

    #[tokio::test]
    async fn extracts_marked_fields() {
        let document = Html::parse_document(LISTING);
        let page = StaticPage::new(
            &document,
            Url::parse("https://geico.wd1.myworkdayjobs.com/External").unwrap(),
        );

        let cards = Workday.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].locator, Locator::css("li[data-automation-id='jobItem']"));

        let first = Workday.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(first.title.text, "Data Engineer");
        assert_eq!(first.location.unwrap().text, "Reston, VA");
        assert_eq!(
            first.url,
            "https://geico.wd1.myworkdayjobs.com/en-US/External/job/Reston-VA/Data-Engineer_R123"
        );

        let second = Workday.extract_record(&page, &cards[1]).await.unwrap().unwrap();
        assert_eq!(second.title.text, "Claims Adjuster");
        assert_eq!(second.location, None);

        assert_eq!(Workday.extract_record(&page, &cards[2]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn title_anchor_cards_use_their_own_text() {
        let document = Html::parse_document(
            r#"<div role="listitem"><a data-automation-id="jobTitle" href="/job/1">Program Manager</a></div>"#,
        );
        let page = StaticPage::new(
            &document,
            Url::parse("https://gmac.wd1.myworkdayjobs.com/GMAC").unwrap(),
        );

        let cards = Workday.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 1);
        let record = Workday.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Program Manager");
        assert_eq!(record.url, "https://gmac.wd1.myworkdayjobs.com/job/1");
    }
}
