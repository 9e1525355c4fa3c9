//! efd-scrape CLI
//!
//! Scrapes filing listings and documents from the Senate eFD search portal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::stream::{self, StreamExt};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use efd_core::{ContentFormat, FilingCategory, FilingRecord, SearchFilters, BASE_URL};
use efd_portal::{random_user_agent, FilingScraper, PortalConfig, DEFAULT_USER_AGENT};

#[derive(Parser)]
#[command(name = "efd-scrape")]
#[command(author, version, about = "Scrape Senate financial disclosure filings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// Portal origin
    #[arg(long, env = "EFD_BASE_URL", default_value = BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "EFD_TIMEOUT", default_value = "30", global = true)]
    timeout: u64,

    /// Proxy URL for all portal traffic (http, https or socks5h)
    #[arg(long, env = "EFD_PROXY", global = true)]
    proxy: Option<String>,

    /// Pick a random browser User-Agent instead of the default one
    #[arg(long, global = true)]
    random_agent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the portal accepts the usage agreement
    Status,

    /// List filings and write them as JSON
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output file (default: filings_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List filings and download their documents
    Download {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory for downloaded documents
        #[arg(long, default_value = "filings")]
        out_dir: PathBuf,

        /// Concurrent downloads
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Download at most this many filings
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CategoryArg {
    /// Annual reports
    Annual,
    /// Periodic transaction reports
    Ptr,
}

impl From<CategoryArg> for FilingCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Annual => FilingCategory::AnnualReport,
            CategoryArg::Ptr => FilingCategory::PeriodicTransactionReport,
        }
    }
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Filing category to include (repeatable; default: all)
    #[arg(short, long = "category", value_enum)]
    categories: Vec<CategoryArg>,

    /// First submission date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,

    /// Last submission date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn to_filters(&self) -> Result<SearchFilters> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
        }

        let mut filters = SearchFilters::new();
        if !self.categories.is_empty() {
            let categories: Vec<FilingCategory> =
                self.categories.iter().map(|c| (*c).into()).collect();
            filters = filters.with_categories(&categories);
        }
        filters.start = self.from.and_then(|d| d.and_hms_opt(0, 0, 0));
        filters.end = self.to.and_then(|d| d.and_hms_opt(23, 59, 59));

        Ok(filters)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = PortalConfig {
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        timeout_secs: cli.timeout,
        user_agent: if cli.random_agent {
            random_user_agent().to_string()
        } else {
            DEFAULT_USER_AGENT.to_string()
        },
        proxy: cli.proxy.clone(),
    };

    match cli.command {
        Commands::Status => check_status(&config).await?,
        Commands::Search { filters, output } => run_search(&config, &filters, output).await?,
        Commands::Download {
            filters,
            out_dir,
            concurrency,
            limit,
        } => run_download(&config, &filters, &out_dir, concurrency, limit).await?,
    }

    Ok(())
}

async fn check_status(config: &PortalConfig) -> Result<()> {
    println!("🔌 Checking portal at {}...\n", config.base_url);

    if efd_portal::check_portal(config).await? {
        println!("✅ Portal accepted the usage agreement");
    } else {
        println!("❌ Could not negotiate a session");
        println!("   Run with -v 2 for request details");
    }

    Ok(())
}

async fn run_search(
    config: &PortalConfig,
    args: &FilterArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let filters = args.to_filters()?;
    let scraper = FilingScraper::new(config)?;

    let records = scraper.scrape(&filters).await?;

    let output_path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        PathBuf::from(format!("filings_{}.json", timestamp))
    });
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(&output_path, json)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!("✅ {} filings saved to {}", records.len(), output_path.display());
    for (category, count) in count_by_category(&records) {
        println!("   {}: {}", category, count);
    }

    Ok(())
}

async fn run_download(
    config: &PortalConfig,
    args: &FilterArgs,
    out_dir: &Path,
    concurrency: usize,
    limit: Option<usize>,
) -> Result<()> {
    let filters = args.to_filters()?;
    let scraper = FilingScraper::new(config)?;

    let records = scraper.scrape(&filters).await?;

    let (papers, documents): (Vec<FilingRecord>, Vec<FilingRecord>) = records
        .into_iter()
        .partition(|r| r.format() == ContentFormat::PaperScan);
    if !papers.is_empty() {
        println!("📄 Skipping {} paper filings (scanned, no text)", papers.len());
    }

    let documents: Vec<FilingRecord> = documents
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let total = documents.len();
    let saved = stream::iter(documents)
        .map(|record| {
            let scraper = scraper.clone();
            let path = out_dir.join(content_filename(&record));
            async move {
                match scraper.download(&record).await {
                    Ok(content) => match tokio::fs::write(&path, &content).await {
                        Ok(()) => {
                            info!("Saved {} ({} bytes)", path.display(), content.len());
                            true
                        }
                        Err(e) => {
                            error!("Failed to write {}: {}", path.display(), e);
                            false
                        }
                    },
                    Err(e) => {
                        error!("Failed to download {}: {}", record.url(), e);
                        false
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter(|ok| futures::future::ready(*ok))
        .count()
        .await;

    println!("✅ Downloaded {} of {} filings into {}", saved, total, out_dir.display());
    Ok(())
}

/// `<last>_<first>_<date>_<id>.html`, restricted to filename-safe characters
fn content_filename(record: &FilingRecord) -> String {
    let stem = format!(
        "{}_{}_{}",
        record.last_name(),
        record.first_name(),
        record.filing_date().format("%Y-%m-%d")
    );
    let safe: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let id: String = record
        .filing_id()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();

    format!("{}_{}.html", safe, id)
}

fn count_by_category(records: &[FilingRecord]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.category().as_str()).or_insert(0) += 1;
    }
    counts
}
