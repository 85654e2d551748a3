//! crawl-tally main entry point
//!
//! This is the command-line interface for running a crawl and producing its
//! CSV exports and text report.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crawl_tally::config::{load_config, load_config_with_hash, Config};
use crawl_tally::crawler::crawl;
use crawl_tally::report::{self, read_snapshot, ContextOverrides, ReportContext};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// crawl-tally: crawl a site and report what was seen
///
/// Crawls a site from its root URL, records every fetch, visit and
/// discovered link, and writes CSV exports plus a text report.
#[derive(Parser, Debug)]
#[command(name = "crawl-tally")]
#[command(version)]
#[command(about = "Crawl a site and tally fetches, visits and links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a crawl and write all outputs
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Validate config and show what would be crawled without crawling
        #[arg(long)]
        dry_run: bool,
    },

    /// Regenerate the text report from existing CSV exports
    Report {
        /// Fetch export (`fetch_<site>.csv`)
        #[arg(long, value_name = "FILE")]
        fetch: PathBuf,

        /// Visit export (`visit_<site>.csv`)
        #[arg(long, value_name = "FILE")]
        visit: PathBuf,

        /// Discovered-URL export (`urls_<site>.csv`)
        #[arg(long, value_name = "FILE")]
        urls: PathBuf,

        /// Crawl configuration supplying the header (label, threads, name, ID)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Site label for the report header [default: from config, else "unknown"]
        #[arg(long)]
        site_label: Option<String>,

        /// Thread count for the report header [default: from config, else 1]
        #[arg(long)]
        threads: Option<u32>,

        /// `Name:` line at the top of the report
        #[arg(long)]
        name: Option<String>,

        /// `ID:` line at the top of the report
        #[arg(long)]
        id: Option<String>,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl { config, dry_run } => {
            tracing::info!("Loading configuration from: {}", config.display());
            let (config, hash) = load_config_with_hash(&config)
                .with_context(|| format!("Failed to load {}", config.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);

            if dry_run {
                handle_dry_run(&config);
                Ok(())
            } else {
                handle_crawl(config).await
            }
        }
        Command::Report {
            fetch,
            visit,
            urls,
            config,
            site_label,
            threads,
            name,
            id,
            output,
        } => {
            let base = match config {
                Some(path) => {
                    let config = load_config(&path)
                        .with_context(|| format!("Failed to load {}", path.display()))?;
                    ReportContext::from_config(&config)
                }
                None => ReportContext::new("unknown", 1),
            };
            let context = base.with_overrides(ContextOverrides {
                site_label,
                threads,
                name,
                id,
            });
            handle_report(&fetch, &visit, &urls, &context, output.as_deref())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_tally=info,warn"),
            1 => EnvFilter::new("crawl_tally=debug,info"),
            2 => EnvFilter::new("crawl_tally=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows what would be crawled
fn handle_dry_run(config: &Config) {
    let crawl = &config.crawl;

    println!("=== crawl-tally Dry Run ===\n");

    println!("Crawl:");
    println!("  Root URL: {}", crawl.root_url);
    println!("  Site: {} ({})", crawl.site_name, crawl.label());
    println!("  Threads: {}", crawl.threads);
    println!("  Max depth: {}", crawl.max_depth);
    println!("  Max pages: {}", crawl.max_pages);
    println!("  Politeness delay: {}ms", crawl.politeness_delay);
    println!("  Connection timeout: {}ms", crawl.connection_timeout);
    println!("  Max download size: {} bytes", crawl.max_download_size);
    println!("  Follow redirects: {}", crawl.follow_redirects);
    println!("  Respect robots.txt: {}", crawl.respect_robots);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    let paths = report::ReportPaths::for_site(Path::new(&config.output.directory), &crawl.site_name);
    println!("\nOutputs:");
    for path in [&paths.fetch_csv, &paths.visit_csv, &paths.urls_csv, &paths.text] {
        println!("  {}", path.display());
    }

    println!("\nSeeds ({}):", crawl.seeds.len() + 1);
    println!("  * {}", crawl.root_url);
    for seed in &crawl.seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let context = ReportContext::from_config(&config);
    let directory = PathBuf::from(&config.output.directory);
    let site = config.crawl.site_name.clone();

    let outcome = crawl(config).await.context("Crawl failed")?;

    let audit = outcome.snapshot.audit();
    if !audit.is_clean() {
        tracing::warn!(
            "Inconsistent observations: {} visits without a successful fetch, \
             {} fetches and {} visits without a discovery (e.g. {:?})",
            audit.visits_without_success,
            audit.fetches_without_discovery,
            audit.visits_without_discovery,
            audit.samples
        );
    }
    if outcome.rejected_inputs > 0 {
        tracing::warn!("{} events rejected for a blank URL", outcome.rejected_inputs);
    }

    let generated = report::generate(&outcome.snapshot, &context)?;
    let paths = report::write_report(&generated, &directory, &site)
        .with_context(|| format!("Failed to write report to {}", directory.display()))?;

    let summary = &outcome.summary;
    println!("Crawl of {} finished in {:.1?}", context.site_label, summary.elapsed);
    println!("  Fetches attempted: {}", generated.statistics.fetch.attempted);
    println!("  Fetches succeeded: {}", generated.statistics.fetch.succeeded);
    println!("  Pages visited: {}", summary.pages_visited);
    println!("  Unique URLs discovered: {}", generated.statistics.links.unique_extracted);
    println!("  Images seen: {}", outcome.images_seen);
    println!("  Network errors: {}", summary.network_errors);
    println!("  Blocked by robots.txt: {}", summary.robots_blocked);
    println!("Report: {}", paths.text.display());

    Ok(())
}

/// Handles the report subcommand: rebuilds the text report from CSV exports
fn handle_report(
    fetch: &Path,
    visit: &Path,
    urls: &Path,
    context: &ReportContext,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let open = |path: &Path| {
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))
    };

    let snapshot = read_snapshot(open(fetch)?, open(visit)?, open(urls)?)
        .context("Failed to read CSV exports")?;
    tracing::info!(
        "Loaded {} fetches, {} visits, {} URLs",
        snapshot.fetches.len(),
        snapshot.visits.len(),
        snapshot.discoveries.len()
    );

    let generated = report::generate(&snapshot, context)?;

    match output {
        Some(path) => {
            std::fs::write(path, &generated.text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print!("{}", generated.text),
    }

    Ok(())
}
