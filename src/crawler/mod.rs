//! Bundled crawl engine
//!
//! This module contains a complete crawler that drives a [`CrawlObserver`]:
//! - HTTP fetching with manual redirect handling
//! - HTML link extraction
//! - Frontier scheduling and politeness
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{extract_links, is_html, resolve_link};
pub use scheduler::{Next, QueuedUrl, Scheduler};

use crate::config::{Config, CrawlConfig};
use crate::observe::{CrawlJob, CrawlObserver, Snapshot};
use crate::Result;
use std::sync::Arc;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Frozen observations, ready for reporting
    pub snapshot: Snapshot,

    /// Image URLs the scope gate saw
    pub images_seen: u64,

    /// Events dropped because their URL was blank
    pub rejected_inputs: u64,

    pub summary: CrawlSummary,
}

/// Runs a complete crawl job
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create a job scoped to the normalized root URL
/// 2. Run the worker pool until the frontier drains
/// 3. Freeze the job's observations
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed
/// * `Err(TallyError)` - The crawl could not be started or a worker died
pub async fn crawl(config: Config) -> Result<CrawlOutcome> {
    let job = Arc::new(CrawlJob::new(&scope_root(&config.crawl)?));
    let observer: Arc<dyn CrawlObserver> = job.clone();

    let summary = run_crawl(config, observer).await?;

    Ok(CrawlOutcome {
        snapshot: job.snapshot(),
        images_seen: job.images_seen(),
        rejected_inputs: job.store().rejected_count(),
        summary,
    })
}

/// The root URL in the form the engine serializes links
///
/// Links reach the classifier as `Url` strings, so the root must be
/// compared in the same form (`https://host:443` becomes `https://host/`).
pub fn scope_root(crawl: &CrawlConfig) -> Result<String> {
    Ok(Url::parse(&crawl.root_url)?.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config_with_root(root_url: &str) -> Config {
        parse_config(&format!(
            r#"
[crawl]
root-url = "{root_url}"
site-name = "example"
threads = 1

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
directory = "out"
"#
        ))
        .unwrap()
    }

    #[test]
    fn test_scope_root_normalizes() {
        let cases = [
            ("https://Example.COM:443", "https://example.com/"),
            ("http://example.com:80/News", "http://example.com/News"),
            ("https://example.com/a/./b/../c", "https://example.com/a/c"),
            ("https://example.com/caf\u{e9} menu", "https://example.com/caf%C3%A9%20menu"),
            ("https://example.com/section/", "https://example.com/section/"),
        ];

        for (root, expected) in cases {
            let config = config_with_root(root);
            assert_eq!(scope_root(&config.crawl).unwrap(), expected, "root {}", root);
        }
    }

    #[test]
    fn test_normalized_root_admits_engine_links() {
        let config = config_with_root("https://example.com:443");
        let job = CrawlJob::new(&scope_root(&config.crawl).unwrap());
        let seed = Url::parse(&config.crawl.root_url).unwrap();

        assert!(job.should_visit(&crate::CandidateLink::new(seed.as_str(), "")));
        assert!(job.should_visit(&crate::CandidateLink::new(
            "https://example.com/news/today",
            seed.as_str()
        )));
    }
}
