use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{AtsStrategy, CandidateCard, CandidateRecord, locate_with};
use crate::error::AppError;
use crate::extract::field::{extract_field, extract_link};
use crate::extract::locator::{Cascade, Locator};
use crate::page::PageHandle;

const SETTLE_DELAY: Duration = Duration::from_secs(3);

const CARDS: Cascade = Cascade::new("greenhouse-cards", &[Locator::css("div.opening")]);
const TITLE: Cascade = Cascade::new("greenhouse-title", &[Locator::css("a")]);
const LOCATION: Cascade = Cascade::new("greenhouse-location", &[Locator::css(".location")]);

/// Greenhouse hosted boards: one `div.opening` per job, the anchor is the title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Greenhouse;

#[async_trait(?Send)]
impl AtsStrategy for Greenhouse {
    fn name(&self) -> &'static str {
        "greenhouse"
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
        tracing::info!("Found {} Greenhouse job openings", cards.len());
        cards
    }

    async fn extract_record<P: PageHandle>(
        &self,
        page: &P,
        card: &CandidateCard<P::Element>,
    ) -> Result<Option<CandidateRecord>, AppError> {
        let Some(title) = extract_field(page, &card.element, &TITLE).await? else {
            return Ok(None);
        };
        let location = extract_field(page, &card.element, &LOCATION).await?;
        let url = extract_link(page, &card.element, &TITLE).await;
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

    #[tokio::test]
    async fn reads_openings() {
        let document = Html::parse_document(
            r#"<section class="level-0">
                 <h3>Engineering</h3>
                 <div class="opening" department_id="4007" office_id="1002">
                   <a data-mapped="true" href="/xometry/jobs/5001">Staff Software Engineer</a>
                   <span class="location">North Bethesda, MD</span>
                 </div>
                 <div class="opening"><a href="https://boards.greenhouse.io/xometry/jobs/5002">Sales Lead</a></div>
                 <div class="opening"><span class="location">Remote</span></div>
               </section>"#,
        );
        let page = StaticPage::new(
            &document,
            Url::parse("https://boards.greenhouse.io/xometry").unwrap(),
        );

        let cards = Greenhouse.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 3);

        let first = Greenhouse.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(first.title.text, "Staff Software Engineer");
        assert_eq!(first.location.unwrap().text, "North Bethesda, MD");
        assert_eq!(first.url, "https://boards.greenhouse.io/xometry/jobs/5001");

        let second = Greenhouse.extract_record(&page, &cards[1]).await.unwrap().unwrap();
        assert_eq!(second.location, None);
        assert_eq!(second.url, "https://boards.greenhouse.io/xometry/jobs/5002");

        assert_eq!(Greenhouse.extract_record(&page, &cards[2]).await.unwrap(), None);
    }
}
