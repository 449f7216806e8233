use serde::Serialize;

pub const LOCATION_NOT_SPECIFIED: &str = "Not specified";

/// A validated job listing, the only value that leaves the engine.
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub company: String,
    pub title: String,
    pub location: String,
    pub url: String,
}

/// How a site pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    Succeeded,
    /// The pass ran but every card was rejected or none were found.
    Empty,
    /// robots.txt disallows the listing page.
    Skipped(String),
    /// Retrieval or extraction fault caught at the site boundary.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SiteResult {
    pub site: String,
    pub records: Vec<JobRecord>,
    pub outcome: SiteOutcome,
}

impl SiteResult {
    pub fn from_records(site: &str, records: Vec<JobRecord>) -> Self {
        let outcome = if records.is_empty() {
            SiteOutcome::Empty
        } else {
            SiteOutcome::Succeeded
        };
        SiteResult {
            site: site.to_string(),
            records,
            outcome,
        }
    }

    pub fn skipped(site: &str, reason: impl Into<String>) -> Self {
        SiteResult {
            site: site.to_string(),
            records: Vec::new(),
            outcome: SiteOutcome::Skipped(reason.into()),
        }
    }

    pub fn failed(site: &str, reason: impl Into<String>) -> Self {
        SiteResult {
            site: site.to_string(),
            records: Vec::new(),
            outcome: SiteOutcome::Failed(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == SiteOutcome::Succeeded
    }
}
