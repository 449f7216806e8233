use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::collectors::runner::HarvestSettings;
use crate::retrieval::browser::BrowserSettings;
use crate::retrieval::http_client::HttpSettings;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Parser, Debug, Clone)]
#[command(name = "jobharvest", about = "Extract job listings from employer career pages")]
pub struct Config {
    /// JSON file with the list of sites to harvest
    #[arg(long, env = "HARVEST_SITES", default_value = "sites.json")]
    pub sites: PathBuf,

    /// Output CSV path
    #[arg(long, env = "HARVEST_OUTPUT", default_value = "all_companies_jobs.csv")]
    pub output: PathBuf,

    /// Only harvest the site with this name (repeatable)
    #[arg(long)]
    pub only: Vec<String>,

    /// Maximum job records kept per site
    #[arg(long, env = "HARVEST_MAX_JOBS", default_value = "200")]
    pub max_jobs: usize,

    /// Upper bound in seconds for one locator attempt on a rendered page
    #[arg(long, env = "HARVEST_ATTEMPT_TIMEOUT", default_value = "10")]
    pub attempt_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HARVEST_REQUEST_TIMEOUT", default_value = "15")]
    pub request_timeout: u64,

    /// Retries for failed HTTP requests
    #[arg(long, env = "HARVEST_MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Base backoff in milliseconds between HTTP retries (doubles each attempt)
    #[arg(long, default_value = "1000")]
    pub retry_backoff_ms: u64,

    /// Minimum politeness delay between sites, in milliseconds
    #[arg(long, default_value = "1500")]
    pub min_delay_ms: u64,

    /// Maximum politeness delay between sites, in milliseconds
    #[arg(long, default_value = "3500")]
    pub max_delay_ms: u64,

    /// User agent sent by both the HTTP client and the browser
    #[arg(long, env = "HARVEST_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Chromium executable; auto-detected when omitted
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Never launch a browser; rendered sites are reported as failures
    #[arg(long)]
    pub no_browser: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn harvest_settings(&self) -> HarvestSettings {
        let (min, max) = if self.min_delay_ms <= self.max_delay_ms {
            (self.min_delay_ms, self.max_delay_ms)
        } else {
            (self.max_delay_ms, self.min_delay_ms)
        };
        HarvestSettings {
            max_jobs: self.max_jobs,
            attempt_timeout: Duration::from_secs(self.attempt_timeout),
            politeness_delay: Duration::from_millis(min)..=Duration::from_millis(max),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.request_timeout),
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            user_agent: self.user_agent.clone(),
            chrome_path: self.chrome_path.clone(),
        }
    }
}
