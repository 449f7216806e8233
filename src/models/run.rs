use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::job::{JobRecord, SiteOutcome, SiteResult};

const FAILED_NAMES_SHOWN: usize = 10;

/// Everything one run produced, in configured site order.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sites: Vec<SiteResult>,
}

impl RunReport {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>, sites: Vec<SiteResult>) -> Self {
        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            sites,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.sites.iter().filter(|s| s.is_success()).count()
    }

    pub fn failed_sites(&self) -> Vec<&str> {
        self.sites
            .iter()
            .filter(|s| !s.is_success())
            .map(|s| s.site.as_str())
            .collect()
    }

    pub fn total_jobs(&self) -> usize {
        self.sites.iter().map(|s| s.records.len()).sum()
    }

    /// All records across sites, in run order.
    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.sites.iter().flat_map(|s| s.records.iter())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        let elapsed = self.finished_at - self.started_at;
        writeln!(f, "{rule}")?;
        writeln!(f, "HARVEST COMPLETE (run {})", self.run_id)?;
        writeln!(
            f,
            "Successful sites: {}/{}",
            self.succeeded(),
            self.sites.len()
        )?;

        let failed = self.failed_sites();
        if !failed.is_empty() {
            writeln!(f, "Failed sites: {}", failed.len())?;
            let shown: Vec<&str> = failed.iter().take(FAILED_NAMES_SHOWN).copied().collect();
            writeln!(f, "  {}", shown.join(", "))?;
            if failed.len() > FAILED_NAMES_SHOWN {
                writeln!(f, "  ... and {} more", failed.len() - FAILED_NAMES_SHOWN)?;
            }
        }

        for site in &self.sites {
            match &site.outcome {
                SiteOutcome::Succeeded => {}
                SiteOutcome::Empty => writeln!(f, "  - {}: no jobs found", site.site)?,
                SiteOutcome::Skipped(reason) => {
                    writeln!(f, "  - {}: skipped ({reason})", site.site)?
                }
                SiteOutcome::Failed(reason) => writeln!(f, "  - {}: error ({reason})", site.site)?,
            }
        }

        writeln!(f, "Total jobs collected: {}", self.total_jobs())?;
        writeln!(f, "Elapsed: {}s", elapsed.num_seconds())?;
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> JobRecord {
        JobRecord {
            company: "Acme".to_string(),
            title: title.to_string(),
            location: "Remote, US".to_string(),
            url: "https://acme.example/jobs".to_string(),
        }
    }

    #[test]
    fn summary_counts_successes_and_failures() {
        let report = RunReport::new(
            Uuid::new_v4(),
            Utc::now(),
            vec![
                SiteResult::from_records("Acme", vec![record("Data Engineer"), record("Analyst")]),
                SiteResult::from_records("Empty Co", vec![]),
                SiteResult::failed("Broken Co", "HTTP error: timed out"),
                SiteResult::skipped("Private Co", "robots.txt disallows /careers"),
            ],
        );

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.total_jobs(), 2);
        assert_eq!(report.failed_sites(), vec!["Empty Co", "Broken Co", "Private Co"]);
        assert_eq!(report.records().count(), 2);

        let text = report.to_string();
        assert!(text.contains("Successful sites: 1/4"));
        assert!(text.contains("Failed sites: 3"));
        assert!(text.contains("Broken Co: error (HTTP error: timed out)"));
        assert!(text.contains("Total jobs collected: 2"));
    }

    #[test]
    fn summary_truncates_long_failure_lists() {
        let sites = (0..12)
            .map(|i| SiteResult::failed(&format!("Site {i}"), "down"))
            .collect();
        let report = RunReport::new(Uuid::new_v4(), Utc::now(), sites);
        assert!(report.to_string().contains("... and 2 more"));
    }
}
