mod config;
mod crawler;
mod error;
mod extract;
mod fetch;
mod html;
mod keys;
mod normalize;
mod report;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use config::SiteConfig;
use crawler::Crawler;
use fetch::HttpFetcher;
use store::PageStore;

#[derive(Parser)]
#[command(name = "shopscan", about = "Single-site crawler and product data miner")]
struct Cli {
    /// Site origin to crawl, e.g. https://shop.example/
    #[arg(short, long)]
    site: String,

    /// Directory holding crawled pages
    #[arg(long, default_value = "html_files")]
    data_dir: PathBuf,

    /// Directory the CSV reports are written to
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the site breadth-first into the page store
    Crawl {
        /// Deepest link layer to fetch (0 = seed only)
        #[arg(short = 'd', long, default_value = "10")]
        depth: usize,
        /// Parallel fetches within one layer
        #[arg(long, default_value = "10")]
        concurrency: usize,
        /// Per-URL fetch timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },
    /// Extract categories, products and summaries from a crawled store
    Analyze {
        /// Keywords reported per category
        #[arg(short = 'k', long, default_value = "5")]
        top_keywords: usize,
    },
    /// Crawl then analyze in one pipeline
    Run {
        #[arg(short = 'd', long, default_value = "10")]
        depth: usize,
        #[arg(long, default_value = "10")]
        concurrency: usize,
        #[arg(long, default_value = "30")]
        timeout: u64,
        #[arg(short = 'k', long, default_value = "5")]
        top_keywords: usize,
    },
    /// Show page store statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let base = SiteConfig::new(&cli.site)
        .with_data_dir(cli.data_dir.clone())
        .with_out_dir(cli.out_dir.clone());

    let result = match cli.command {
        Commands::Crawl {
            depth,
            concurrency,
            timeout,
        } => {
            let config = crawl_config(base, depth, concurrency, timeout);
            crawl(config).await
        }
        Commands::Analyze { top_keywords } => analyze(base.with_top_keywords(top_keywords)),
        Commands::Run {
            depth,
            concurrency,
            timeout,
            top_keywords,
        } => {
            let config =
                crawl_config(base, depth, concurrency, timeout).with_top_keywords(top_keywords);
            crawl(config.clone()).await?;
            analyze(config)
        }
        Commands::Stats => stats(base),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn crawl_config(base: SiteConfig, depth: usize, concurrency: usize, timeout: u64) -> SiteConfig {
    base.with_max_depth(depth)
        .with_concurrency(concurrency)
        .with_fetch_timeout(Duration::from_secs(timeout))
}

async fn crawl(config: SiteConfig) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout)?);
    let store = PageStore::open(config.data_dir.clone());
    let stats = Crawler::new(config, store, fetcher).crawl().await?;
    println!(
        "Crawled {} urls ({} saved, {} errors), {} discovered, {} left unvisited.",
        stats.fetched, stats.saved, stats.errors, stats.discovered, stats.frontier_left
    );
    Ok(())
}

fn analyze(config: SiteConfig) -> anyhow::Result<()> {
    let store = PageStore::open(config.data_dir.clone());
    let report = extract::run(&config, &store)?;
    report::write_reports(&config.out_dir, &report.products, &report.summaries)?;

    println!(
        "{} categories, {} products.\n",
        report.categories.len(),
        report.products.len()
    );
    report::print_summaries(&report.summaries);
    Ok(())
}

fn stats(config: SiteConfig) -> anyhow::Result<()> {
    let store = PageStore::open(config.data_dir.clone());
    let manifest = store.load_manifest()?;
    println!("Store:    {}", store.root().display());
    println!("Pages:    {}", store.page_count()?);
    println!("Manifest: {} urls", manifest.len());
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
