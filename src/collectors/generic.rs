use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::collectors::{AtsStrategy, CandidateCard, CandidateRecord, locate_with};
use crate::error::AppError;
use crate::extract::field::{FieldSource, RawField, extract_field, extract_link};
use crate::extract::locator::{Cascade, FALLBACK_JOB_SELECTORS, Locator};
use crate::extract::normalize::normalize;
use crate::extract::validate::is_plausible_title;
use crate::page::PageHandle;

const SETTLE_DELAY: Duration = Duration::from_secs(4);

/// Cards whose text is longer than this are page sections, not job cards.
const MAX_CARD_TEXT: usize = 500;

const JOB_PATH_KEYWORDS: &[&str] = &["/job", "/career", "/position", "/opening"];

/// Locator recorded on cards found by the last-resort link scan.
const LINK_SCAN: Locator = Locator::css("a[href]");

const TITLE: Cascade = Cascade::new(
    "generic-title",
    &[
        Locator::css("[class*='job-title']"),
        Locator::css("[class*='jobTitle']"),
        Locator::css("[class*='position-title']"),
        Locator::css("[class*='posting-title']"),
        Locator::css("[itemprop='title']"),
        Locator::css("[data-automation-id='jobTitle']"),
    ],
);

const LOCATION: Cascade = Cascade::new(
    "generic-location",
    &[
        Locator::css("[class*='job-location']"),
        Locator::css("[itemprop='jobLocation']"),
        Locator::css("[data-automation-id='location']"),
        Locator::css("[class*='location']"),
    ],
);

const LINK: Cascade = Cascade::new(
    "generic-link",
    &[
        Locator::css("a[href*='/job']"),
        Locator::css("a[href*='/career']"),
        Locator::css("a[href*='/position']"),
        Locator::css("a[href*='/opening']"),
    ],
);

static UI_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:save|apply|view)").expect("valid pattern"));

/// Fallback for career pages with no recognised ATS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generic;

#[async_trait(?Send)]
impl AtsStrategy for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn settle_delay(&self) -> Duration {
        SETTLE_DELAY
    }

    async fn locate_cards<P: PageHandle>(
        &self,
        page: &P,
        attempt_timeout: Duration,
    ) -> Vec<CandidateCard<P::Element>> {
        let cards = locate_with(page, &FALLBACK_JOB_SELECTORS, attempt_timeout).await;
        if let Some(first) = cards.first() {
            tracing::info!(
                "Found {} elements with selector: {}",
                cards.len(),
                first.locator
            );
            return cards;
        }

        let links = match page.query(&LINK_SCAN, None).await {
            Ok(links) => links,
            Err(e) => {
                tracing::debug!("job link scan failed: {e}");
                return Vec::new();
            }
        };
        let mut cards = Vec::new();
        for link in links {
            match is_job_link(page, &link).await {
                Ok(true) => cards.push(CandidateCard {
                    element: link,
                    locator: LINK_SCAN,
                }),
                Ok(false) => {}
                Err(e) => tracing::debug!("Error checking link ({LINK_SCAN}): {e}"),
            }
        }
        if !cards.is_empty() {
            tracing::info!("Found {} potential job links", cards.len());
        }
        cards
    }

    async fn extract_record<P: PageHandle>(
        &self,
        page: &P,
        card: &CandidateCard<P::Element>,
    ) -> Result<Option<CandidateRecord>, AppError> {
        let structured = extract_field(page, &card.element, &TITLE)
            .await?
            .filter(|title| is_plausible_title(&title.text));

        let (title, location) = match structured {
            Some(title) => {
                let location = extract_field(page, &card.element, &LOCATION).await?;
                (title, location)
            }
            None => {
                let text = page.read_text(&card.element).await?;
                let text = text.trim();
                if text.is_empty() || text.chars().count() > MAX_CARD_TEXT {
                    return Ok(None);
                }
                let Some(block) = split_text_block(text) else {
                    return Ok(None);
                };
                let location = block.location.map(|text| RawField {
                    text,
                    source: FieldSource::CardText,
                });
                let title = RawField {
                    text: block.title,
                    source: FieldSource::CardText,
                };
                (title, location)
            }
        };

        let url = extract_link(page, &card.element, &LINK).await;
        Ok(Some(CandidateRecord {
            title,
            location,
            url,
        }))
    }
}

/// Whether `link` targets a job-looking path and its text reads like a title.
async fn is_job_link<P: PageHandle>(page: &P, link: &P::Element) -> Result<bool, AppError> {
    let href = page
        .read_attribute(link, "href")
        .await?
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !JOB_PATH_KEYWORDS.iter().any(|k| href.contains(k)) {
        return Ok(false);
    }
    let text = normalize(&page.read_text(link).await?);
    Ok(is_plausible_title(&text))
}

/// Title and location read out of an opaque, line-broken card text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub title: String,
    pub location: Option<String>,
}

/// The first line that passes the title check is the title; the next line
/// after it that is longer than two characters and is not a Save/Apply/View
/// action is the location.
///
/// A department or team line sitting between title and location is taken as
/// the location; the markup gives no way to tell them apart.
pub fn split_text_block(text: &str) -> Option<TextBlock> {
    let mut title: Option<String> = None;
    for line in text.lines() {
        let line = normalize(line);
        if line.is_empty() {
            continue;
        }
        match &title {
            None => {
                if is_plausible_title(&line) {
                    title = Some(line);
                }
            }
            Some(_) => {
                if line.chars().count() > 2 && !UI_ACTION.is_match(&line) {
                    return title.map(|title| TextBlock {
                        title,
                        location: Some(line),
                    });
                }
            }
        }
    }
    title.map(|title| TextBlock {
        title,
        location: None,
    })
}

#[cfg(test)]
mod tests {
    use scraper::Html;
    use url::Url;

    use super::*;
    use crate::page::StaticPage;

    fn base() -> Url {
        Url::parse("https://www.example-careers.com/careers").unwrap()
    }

    #[test]
    fn text_block_skips_actions_around_fields() {
        let block = split_text_block("Save\nSenior Analyst\nWashington, DC\nApply Now").unwrap();
        assert_eq!(block.title, "Senior Analyst");
        assert_eq!(block.location.as_deref(), Some("Washington, DC"));
    }

    #[test]
    fn text_block_keeps_looking_past_action_lines() {
        let block =
            split_text_block("Project Coordinator\nView details\nApply today\nArlington, VA").unwrap();
        assert_eq!(block.title, "Project Coordinator");
        assert_eq!(block.location.as_deref(), Some("Arlington, VA"));
    }

    #[test]
    fn text_block_without_location() {
        let block = split_text_block("3 Results\nAccountant").unwrap();
        assert_eq!(block.title, "Accountant");
        assert_eq!(block.location, None);
        assert_eq!(split_text_block("Save\nVA\n12"), None);
    }

    #[tokio::test]
    async fn first_fallback_selector_wins() {
        let document = Html::parse_document(
            r#"<div class="job-card">ignored because links come first</div>
               <a href="/jobs/1">Field Technician</a>
               <a href="/jobs/2" class="filter-link">Filters</a>"#,
        );
        let page = StaticPage::new(&document, base());
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(
            cards[0].locator,
            Locator::css("a[href*='/job']:not([class*='filter'])")
        );

        let record = Generic.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Field Technician");
        assert_eq!(record.url, "https://www.example-careers.com/jobs/1");
    }

    #[tokio::test]
    async fn structured_fields_beat_text_heuristic() {
        let document = Html::parse_document(
            r#"<div class="job-card">
                 <span class="badge">New</span>
                 <h4 class="job-title">Benefits Specialist</h4>
                 <span class="team">People Ops</span>
                 <span class="job-location">Location: Herndon, VA</span>
                 <a href="https://apply.example.com/req/88">Apply</a>
               </div>"#,
        );
        let page = StaticPage::new(&document, base());
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        let record = Generic.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Benefits Specialist");
        assert_eq!(record.location.unwrap().text, "Herndon, VA");
        assert_eq!(record.url, "https://apply.example.com/req/88");
    }

    #[tokio::test]
    async fn opaque_cards_use_text_heuristic() {
        let document = Html::parse_document(
            r#"<article class="job-listing">
                 <button>Save</button>
                 <h3>Senior Analyst</h3>
                 <p>Washington, DC</p>
                 <a href="/req/senior-analyst">Apply Now</a>
               </article>"#,
        );
        let page = StaticPage::new(&document, base());
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].locator, Locator::css("article[class*='job']"));

        let record = Generic.extract_record(&page, &cards[0]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "Senior Analyst");
        assert_eq!(record.location.unwrap().text, "Washington, DC");
        assert_eq!(record.url, "https://www.example-careers.com/req/senior-analyst");
    }

    #[tokio::test]
    async fn oversized_cards_are_discarded() {
        let filler = "lorem ipsum dolor ".repeat(40);
        let html = format!(r#"<div class="job-card"><h3>Welder</h3><p>{filler}</p></div>"#);
        let document = Html::parse_document(&html);
        let page = StaticPage::new(&document, base());
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(Generic.extract_record(&page, &cards[0]).await.unwrap(), None);
    }

    /// Page with nothing but bare links; reading the text of `broken` fails.
    struct LinkList {
        url: Url,
        links: Vec<(&'static str, &'static str)>,
        broken: usize,
    }

    #[async_trait(?Send)]
    impl PageHandle for LinkList {
        type Element = usize;

        fn url(&self) -> &Url {
            &self.url
        }

        async fn query(&self, locator: &Locator, root: Option<&usize>) -> Result<Vec<usize>, AppError> {
            if root.is_none() && *locator == LINK_SCAN {
                return Ok((0..self.links.len()).collect());
            }
            Ok(Vec::new())
        }

        async fn read_text(&self, element: &usize) -> Result<String, AppError> {
            if *element == self.broken {
                return Err(AppError::Page("stale element handle".to_string()));
            }
            Ok(self.links[*element].1.to_string())
        }

        async fn read_attribute(&self, element: &usize, name: &str) -> Result<Option<String>, AppError> {
            Ok((name == "href").then(|| self.links[*element].0.to_string()))
        }

        async fn tag_name(&self, _element: &usize) -> Result<String, AppError> {
            Ok("a".to_string())
        }
    }

    #[tokio::test]
    async fn link_scan_skips_unreadable_links() {
        let page = LinkList {
            url: base(),
            links: vec![
                ("/jobs/1", "Budget Analyst"),
                ("/jobs/2", "Grants Manager"),
                ("/jobs/3", "Fleet Mechanic"),
            ],
            broken: 1,
        };
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        let found: Vec<usize> = cards.iter().map(|c| c.element).collect();
        assert_eq!(found, [0, 2]);
    }

    #[tokio::test]
    async fn link_scan_is_the_last_resort() {
        let document = Html::parse_document(
            r#"<nav><a href="/about">About Us</a><a href="/Positions/view?id=9">Home</a></nav>
               <ul>
                 <li><a href="https://ats.example.net/Opening/123">Maintenance Supervisor</a></li>
                 <li><a href="/position/77">GIS Analyst</a></li>
               </ul>"#,
        );
        let page = StaticPage::new(&document, base());
        let cards = Generic.locate_cards(&page, Duration::from_millis(10)).await;
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.locator == LINK_SCAN));

        let record = Generic.extract_record(&page, &cards[1]).await.unwrap().unwrap();
        assert_eq!(record.title.text, "GIS Analyst");
        assert_eq!(record.url, "https://www.example-careers.com/position/77");
    }
}
