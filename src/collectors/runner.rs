use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use scraper::Html;
use uuid::Uuid;

use crate::collectors::{AtsStrategy, CandidateRecord, SmartRecruiters, Strategy};
use crate::error::AppError;
use crate::extract::dedupe::Deduplicator;
use crate::extract::normalize::normalize;
use crate::extract::validate::is_plausible_title;
use crate::models::job::{JobRecord, LOCATION_NOT_SPECIFIED, SiteResult};
use crate::models::run::RunReport;
use crate::models::site::{RetrievalMode, SiteDescriptor};
use crate::page::{PageHandle, StaticPage};
use crate::retrieval::{BrowserLauncher, BrowserSession, Retriever};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Output cap per site.
    pub max_jobs: usize,
    /// Bound on one locator attempt against a rendered page.
    pub attempt_timeout: Duration,
    /// Random pause between consecutive sites.
    pub politeness_delay: RangeInclusive<Duration>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        HarvestSettings {
            max_jobs: 200,
            attempt_timeout: Duration::from_secs(10),
            politeness_delay: Duration::from_millis(1500)..=Duration::from_millis(3500),
        }
    }
}

impl HarvestSettings {
    /// Cards looked at per site before giving up on filling the cap.
    pub fn max_attempted_cards(&self) -> usize {
        self.max_jobs.saturating_mul(2)
    }
}

/// Runs sites one after another and turns every per-site fault into a soft
/// failure. Owns the browser launcher; each rendered site gets its own session,
/// closed before the next site starts.
pub struct Harvester<R, B> {
    retriever: R,
    browser: B,
    settings: HarvestSettings,
}

impl<R: Retriever, B: BrowserLauncher> Harvester<R, B> {
    pub fn new(retriever: R, browser: B, settings: HarvestSettings) -> Self {
        Harvester {
            retriever,
            browser,
            settings,
        }
    }

    /// Harvest every site in order.
    pub async fn run(&self, sites: &[SiteDescriptor]) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!("Run {run_id} started: {} sites", sites.len());

        let mut results = Vec::with_capacity(sites.len());
        for (idx, site) in sites.iter().enumerate() {
            if idx > 0 {
                self.politeness_pause().await;
            }
            tracing::info!("[{}/{}] Processing {}", idx + 1, sites.len(), site.name);
            results.push(self.harvest_site(site).await);
        }

        let report = RunReport::new(run_id, started_at, results);
        tracing::info!(
            "Run {run_id} completed: {}/{} sites succeeded, {} jobs",
            report.succeeded(),
            report.sites.len(),
            report.total_jobs()
        );
        report
    }

    /// One site pass. Never fails: faults become an empty, failed result.
    pub async fn harvest_site(&self, site: &SiteDescriptor) -> SiteResult {
        if site.mode != RetrievalMode::Api && !self.retriever.robots_allowed(&site.entry_url).await
        {
            tracing::warn!("[SKIP] robots.txt forbids scraping {}", site.entry_url);
            return SiteResult::skipped(&site.name, "disallowed by robots.txt");
        }

        tracing::info!("[SCRAPING] {} ({}, {:?})", site.name, site.platform, site.mode);
        match self.extract_site(site).await {
            Ok(records) => {
                if records.is_empty() {
                    tracing::warn!("No jobs extracted from {}", site.name);
                } else {
                    tracing::info!(
                        "Successfully extracted {} jobs from {}",
                        records.len(),
                        site.name
                    );
                }
                SiteResult::from_records(&site.name, records)
            }
            Err(e) => {
                if e.is_retrieval() {
                    tracing::warn!("Retrieval failed for {}: {e}", site.name);
                } else {
                    tracing::error!("Extraction failed for {}: {e}", site.name);
                }
                SiteResult::failed(&site.name, e.to_string())
            }
        }
    }

    async fn extract_site(&self, site: &SiteDescriptor) -> Result<Vec<JobRecord>, AppError> {
        match site.mode {
            RetrievalMode::Api => {
                tracing::info!("[API] Fetching {} feed {}", SmartRecruiters.name(), site.entry_url);
                let feed = self.retriever.fetch_json(&site.entry_url).await?;
                let candidates = SmartRecruiters.parse_postings(&feed, &site.entry_url)?;
                let mut sink = RecordSink::new(&site.company, self.settings.max_jobs);
                for candidate in candidates {
                    if sink.is_full() {
                        break;
                    }
                    sink.offer(candidate);
                }
                Ok(sink.finish(&site.name))
            }
            RetrievalMode::StaticHttp => {
                let strategy = strategy_for(site)?;
                let fetched = self.retriever.fetch_static(&site.entry_url).await?;
                let document = Html::parse_document(&fetched.body);
                let page = StaticPage::new(&document, fetched.url);
                Ok(self.extract_cards(&strategy, &page, site).await)
            }
            RetrievalMode::RenderedBrowser => {
                let strategy = strategy_for(site)?;
                let mut session = self.browser.launch().await?;
                let result = match session.open(&site.entry_url, strategy.settle_delay()).await {
                    Ok(page) => Ok(self.extract_cards(&strategy, &page, site).await),
                    Err(e) => Err(e),
                };
                if let Err(e) = session.close().await {
                    tracing::debug!("Closing browser after {} failed: {e}", site.name);
                }
                result
            }
        }
    }

    async fn extract_cards<P: PageHandle>(
        &self,
        strategy: &Strategy,
        page: &P,
        site: &SiteDescriptor,
    ) -> Vec<JobRecord> {
        let cards = strategy
            .locate_cards(page, self.settings.attempt_timeout)
            .await;
        if cards.is_empty() {
            tracing::warn!("No {} job cards found on {}", strategy.name(), site.entry_url);
        }

        let mut sink = RecordSink::new(&site.company, self.settings.max_jobs);
        for card in cards.iter().take(self.settings.max_attempted_cards()) {
            if sink.is_full() {
                break;
            }
            match strategy.extract_record(page, card).await {
                Ok(Some(candidate)) => sink.offer(candidate),
                Ok(None) => {}
                Err(e) => tracing::debug!("Error processing card ({}): {e}", card.locator),
            }
        }
        sink.finish(&site.name)
    }

    async fn politeness_pause(&self) {
        let range = &self.settings.politeness_delay;
        let (min, max) = (range.start().as_millis(), range.end().as_millis());
        if max == 0 {
            return;
        }
        let millis = if min < max {
            rand::rng().random_range(min..=max)
        } else {
            max
        };
        tokio::time::sleep(Duration::from_millis(millis as u64)).await;
    }
}

fn strategy_for(site: &SiteDescriptor) -> Result<Strategy, AppError> {
    Strategy::for_platform(site.platform).ok_or_else(|| {
        AppError::Config(format!(
            "site '{}' has no page strategy for platform {}",
            site.name, site.platform
        ))
    })
}

/// Validates, cleans and de-duplicates candidates for one site, up to the cap.
struct RecordSink<'a> {
    company: &'a str,
    cap: usize,
    dedup: Deduplicator,
    records: Vec<JobRecord>,
    rejected: usize,
    duplicates: usize,
}

impl<'a> RecordSink<'a> {
    fn new(company: &'a str, cap: usize) -> Self {
        RecordSink {
            company,
            cap,
            dedup: Deduplicator::new(),
            records: Vec::new(),
            rejected: 0,
            duplicates: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.records.len() >= self.cap
    }

    fn offer(&mut self, candidate: CandidateRecord) {
        let title = normalize(&candidate.title.text);
        if !is_plausible_title(&title) {
            self.rejected += 1;
            return;
        }

        let location = candidate
            .location
            .map(|field| normalize(&field.text))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| LOCATION_NOT_SPECIFIED.to_string());

        let record = JobRecord {
            company: self.company.to_string(),
            title,
            location,
            url: candidate.url,
        };
        if self.dedup.admit(&record) {
            self.records.push(record);
        } else {
            self.duplicates += 1;
        }
    }

    fn finish(self, site: &str) -> Vec<JobRecord> {
        tracing::debug!(
            "{site}: kept {}, rejected {} titles, dropped {} duplicates",
            self.records.len(),
            self.rejected,
            self.duplicates
        );
        self.records
    }
}
