use std::collections::HashSet;

use crate::extract::normalize::normalize;
use crate::models::job::JobRecord;

/// Tracks titles already emitted during one site pass. Create a fresh one per
/// site; duplicates across sites are legitimate.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time a normalized title is offered, false afterwards.
    pub fn admit(&mut self, record: &JobRecord) -> bool {
        self.seen.insert(normalize(&record.title))
    }
}

/// Order-preserving de-duplication by normalized title; first occurrence wins.
pub fn dedupe(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut dedup = Deduplicator::new();
    records.into_iter().filter(|r| dedup.admit(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str) -> JobRecord {
        JobRecord {
            company: "Acme".to_string(),
            title: title.to_string(),
            location: "Arlington, VA".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let records = vec![
            record("Software Engineer", "https://a/1"),
            record("Data Analyst", "https://a/2"),
            record("Software  Engineer", "https://a/3"),
            record("Software Engineer", "https://a/4"),
        ];
        let out = dedupe(records);
        let urls: Vec<&str> = out.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2"]);
    }

    #[test]
    fn separate_passes_do_not_share_state() {
        let mut first = Deduplicator::new();
        let mut second = Deduplicator::new();
        let job = record("Software Engineer", "https://a/1");
        assert!(first.admit(&job));
        assert!(!first.admit(&job));
        assert!(second.admit(&job));
    }
}
