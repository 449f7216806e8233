use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::AppError;

/// Applicant tracking system family behind a career page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum PlatformType {
    Workday,
    Greenhouse,
    Lever,
    /// SmartRecruiters JSON postings feed.
    Api,
    Generic,
}

impl From<&str> for PlatformType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "workday" => PlatformType::Workday,
            "greenhouse" => PlatformType::Greenhouse,
            "lever" => PlatformType::Lever,
            "api" | "smartrecruiters" => PlatformType::Api,
            // custom, adp, icims, taleo and anything unknown
            _ => PlatformType::Generic,
        }
    }
}

impl From<String> for PlatformType {
    fn from(value: String) -> Self {
        PlatformType::from(value.as_str())
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlatformType::Workday => "workday",
            PlatformType::Greenhouse => "greenhouse",
            PlatformType::Lever => "lever",
            PlatformType::Api => "api",
            PlatformType::Generic => "generic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalMode {
    Api,
    #[serde(alias = "rendered", alias = "browser", alias = "selenium")]
    RenderedBrowser,
    #[serde(alias = "static", alias = "http")]
    StaticHttp,
}

/// One entry of the sites file, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<PlatformType>,
    pub company: Option<String>,
    pub mode: Option<RetrievalMode>,
}

/// A validated harvest target. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDescriptor {
    pub name: String,
    pub entry_url: Url,
    pub platform: PlatformType,
    pub company: String,
    pub mode: RetrievalMode,
}

impl SiteDescriptor {
    pub fn new(
        name: impl Into<String>,
        entry_url: &str,
        platform: PlatformType,
        company: impl Into<String>,
        mode: RetrievalMode,
    ) -> Result<Self, AppError> {
        let config = SiteConfig {
            name: name.into(),
            url: Some(entry_url.to_string()),
            platform: Some(platform),
            company: Some(company.into()),
            mode: Some(mode),
        };
        SiteDescriptor::try_from(config)
    }
}

impl TryFrom<SiteConfig> for SiteDescriptor {
    type Error = AppError;

    fn try_from(config: SiteConfig) -> Result<Self, Self::Error> {
        let name = config.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Config("site entry without a name".to_string()));
        }

        let raw_url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Config(format!("site '{name}' has no url")))?;
        let entry_url = Url::parse(raw_url)
            .map_err(|e| AppError::Config(format!("site '{name}' has invalid url '{raw_url}': {e}")))?;
        if !matches!(entry_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "site '{name}' url must be http(s), got '{raw_url}'"
            )));
        }

        let mode = config
            .mode
            .ok_or_else(|| AppError::Config(format!("site '{name}' has no retrieval mode")))?;
        let platform = config.platform.unwrap_or(PlatformType::Generic);

        match (platform, mode) {
            (PlatformType::Api, RetrievalMode::Api) => {}
            (PlatformType::Api, _) => {
                return Err(AppError::Config(format!(
                    "site '{name}' uses the api platform but not the api retrieval mode"
                )));
            }
            (_, RetrievalMode::Api) => {
                return Err(AppError::Config(format!(
                    "site '{name}' uses the api retrieval mode with platform {platform}"
                )));
            }
            _ => {}
        }

        let company = config
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| name.clone());

        Ok(SiteDescriptor {
            name,
            entry_url,
            platform,
            company,
            mode,
        })
    }
}

/// Parse and validate a sites file. Any invalid entry fails the whole load.
pub fn parse_sites(json: &str) -> Result<Vec<SiteDescriptor>, AppError> {
    let entries: Vec<SiteConfig> = serde_json::from_str(json)
        .map_err(|e| AppError::Config(format!("invalid sites file: {e}")))?;
    entries.into_iter().map(SiteDescriptor::try_from).collect()
}

pub fn load_sites(path: &Path) -> Result<Vec<SiteDescriptor>, AppError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_sites(&json)
}
