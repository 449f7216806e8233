use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobharvest::collectors::runner::Harvester;
use jobharvest::config::{Config, LogFormat};
use jobharvest::models::site::load_sites;
use jobharvest::output::write_csv;
use jobharvest::retrieval::{ChromiumLauncher, HttpRetriever, NoBrowser};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobharvest=info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format);

    let mut sites = load_sites(&config.sites)?;
    if !config.only.is_empty() {
        sites.retain(|site| {
            config
                .only
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&site.name))
        });
        if sites.is_empty() {
            anyhow::bail!("No site in {} matches --only {:?}", config.sites.display(), config.only);
        }
    }
    tracing::info!("Loaded {} sites from {}", sites.len(), config.sites.display());

    let retriever = HttpRetriever::new(config.http_settings())?;
    let settings = config.harvest_settings();
    let report = if config.no_browser {
        Harvester::new(retriever, NoBrowser, settings)
            .run(&sites)
            .await
    } else {
        let launcher = ChromiumLauncher::new(config.browser_settings());
        Harvester::new(retriever, launcher, settings)
            .run(&sites)
            .await
    };

    let rows = write_csv(&config.output, report.records())?;
    println!("{report}");
    println!("Output file: {} ({rows} rows)", config.output.display());

    Ok(())
}
