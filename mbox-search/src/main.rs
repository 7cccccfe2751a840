//! mbox-search CLI
//!
//! ```bash
//! # Index data/sample.mbox in memory and search for SMTP
//! mbox-search
//!
//! # Search another mailbox, keep the index on disk
//! mbox-search --mbox archive.mbox --index-dir ./index "subject:relay"
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mbox_search::config::{Config, LoggingConfig};
use mbox_search::pipeline;
use mbox_search::search::SearchOrder;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_FILE: &str = "mbox-search.toml";

#[derive(Parser)]
#[command(name = "mbox-search")]
#[command(about = "Index an mbox file and search it", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./mbox-search.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MBOX file to index
    #[arg(short, long)]
    mbox: Option<PathBuf>,

    /// Keep the index in this directory instead of memory
    #[arg(short, long)]
    index_dir: Option<PathBuf>,

    /// Maximum number of hits
    #[arg(short, long)]
    limit: Option<usize>,

    /// Result order
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Query to run
    query: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    SentDate,
    Relevance,
}

impl From<OrderArg> for SearchOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::SentDate => SearchOrder::SentDateDesc,
            OrderArg::Relevance => SearchOrder::Relevance,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };

    if let Some(mbox) = &cli.mbox {
        config.source.mbox_path = mbox.clone();
    }
    if let Some(index_dir) = &cli.index_dir {
        config.index.path = Some(index_dir.clone());
    }
    if let Some(limit) = cli.limit {
        config.search.limit = limit;
    }
    if let Some(order) = cli.order {
        config.search.order = order.into();
    }
    if let Some(query) = &cli.query {
        config.search.query = query.clone();
    }

    Ok(config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("mbox_search={},tantivy=warn", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match logging.format.as_str() {
        "json" => registry.with(fmt.json()).init(),
        "compact" => registry.with(fmt.compact()).init(),
        _ => registry.with(fmt.pretty()).init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).context("Failed to load configuration")?;

    init_logging(&config.logging);
    info!("Starting mbox-search v{}", env!("CARGO_PKG_VERSION"));

    let outcome = pipeline::run(&config)
        .with_context(|| format!("Failed to search {}", config.source.mbox_path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for hit in &outcome.results.hits {
            println!("Subject: {}", hit.subject);
        }
    }

    Ok(())
}
