//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier
//! - A pool of worker tasks sharing one scheduler
//! - Robots.txt checks, fetching, and link extraction
//! - Reporting every event to a [`CrawlObserver`]

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::{extract_links, is_html, resolve_link};
use crate::crawler::scheduler::{Next, QueuedUrl, Scheduler};
use crate::observe::{CandidateLink, CrawlObserver};
use crate::robots::{origin_of, robots_for, RobotsCache};
use crate::{Result, TallyError};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

/// Engine-side counters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Responses that carried a status code
    pub responses: u64,

    /// Pages handed to the observer as visited
    pub pages_visited: u64,

    /// Successful responses dropped for exceeding `max-download-size`
    pub oversized: u64,

    /// Fetches that produced no status
    pub network_errors: u64,

    /// URLs skipped because robots.txt disallowed them
    pub robots_blocked: u64,

    /// URLs ever scheduled, seeds included
    pub scheduled: u64,

    pub elapsed: Duration,
}

#[derive(Default)]
struct Counters {
    responses: AtomicU64,
    pages_visited: AtomicU64,
    oversized: AtomicU64,
    network_errors: AtomicU64,
    robots_blocked: AtomicU64,
}

/// State shared by all workers
struct Shared {
    config: Config,
    client: Client,
    observer: Arc<dyn CrawlObserver>,
    scheduler: Mutex<Scheduler>,
    robots: RobotsCache,
    counters: Counters,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    /// * `observer` - Receives every scope question, fetch, and visit
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TallyError)` - The HTTP client could not be built
    pub fn new(config: Config, observer: Arc<dyn CrawlObserver>) -> Result<Self> {
        let client = build_http_client(&config.crawl, &config.user_agent)?;
        let scheduler = Scheduler::from_config(&config.crawl);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                client,
                observer,
                scheduler: Mutex::new(scheduler),
                robots: RobotsCache::new(),
                counters: Counters::default(),
            }),
        })
    }

    /// Runs the crawl to completion
    ///
    /// Seeds are offered to the observer with an empty referrer, then
    /// scheduled at depth 0 whatever its answer. The crawl ends when the
    /// frontier is empty and no worker has a fetch in flight.
    pub async fn run(self) -> Result<CrawlSummary> {
        let start_time = Instant::now();
        let crawl = &self.shared.config.crawl;

        {
            let mut scheduler = self.shared.scheduler.lock().await;
            for seed in std::iter::once(&crawl.root_url).chain(crawl.seeds.iter()) {
                let mut url = Url::parse(seed)?;
                url.set_fragment(None);
                // Seeds are tallied like any discovery but always scheduled
                self.shared
                    .observer
                    .should_visit(&CandidateLink::new(url.as_str(), ""));
                if !scheduler.schedule(url, 0) {
                    tracing::debug!("Seed {} not scheduled (duplicate or over budget)", seed);
                }
            }
        }

        tracing::info!(
            "Starting crawl of {} with {} workers (max depth {}, max pages {})",
            crawl.root_url,
            crawl.threads,
            crawl.max_depth,
            crawl.max_pages
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..crawl.threads {
            let shared = Arc::clone(&self.shared);
            workers.spawn(async move { shared.work(worker_id).await });
        }

        while let Some(joined) = workers.join_next().await {
            joined.map_err(|e| TallyError::Worker(e.to_string()))?;
        }

        let counters = &self.shared.counters;
        let summary = CrawlSummary {
            responses: counters.responses.load(Ordering::Relaxed),
            pages_visited: counters.pages_visited.load(Ordering::Relaxed),
            oversized: counters.oversized.load(Ordering::Relaxed),
            network_errors: counters.network_errors.load(Ordering::Relaxed),
            robots_blocked: counters.robots_blocked.load(Ordering::Relaxed),
            scheduled: self.shared.scheduler.lock().await.scheduled_count() as u64,
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} responses, {} pages visited in {:?}",
            summary.responses,
            summary.pages_visited,
            summary.elapsed
        );

        Ok(summary)
    }
}

impl Shared {
    /// Worker loop: take ready URLs until the scheduler reports the end
    async fn work(&self, worker_id: u32) {
        tracing::debug!("Worker {} started", worker_id);
        let mut processed = 0u64;

        loop {
            let next = self.scheduler.lock().await.next(Instant::now());
            match next {
                Next::Ready(queued) => {
                    self.process_url(&queued).await;
                    self.scheduler.lock().await.complete();
                    processed += 1;
                }
                Next::Wait(wait) => tokio::time::sleep(wait).await,
                Next::Finished => break,
            }
        }

        tracing::debug!("Worker {} finished after {} URLs", worker_id, processed);
    }

    /// Processes a single URL
    ///
    /// This method:
    /// 1. Checks robots.txt
    /// 2. Fetches the page
    /// 3. Reports the status, and the visit for successful pages
    /// 4. Offers new links (or the redirect target) to the observer
    async fn process_url(&self, queued: &QueuedUrl) {
        let url_str = queued.url.as_str();

        if self.config.crawl.respect_robots && !self.robots_allow(queued).await {
            tracing::info!("URL {} disallowed by robots.txt", url_str);
            self.counters.robots_blocked.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let max_bytes = self.config.crawl.max_download_size;
        let result = fetch_url(&self.client, &queued.url, max_bytes).await;
        if let Some((status_code, description)) = result.status() {
            self.counters.responses.fetch_add(1, Ordering::Relaxed);
            self.observer
                .on_fetch_attempt(url_str, status_code, description);
        }

        match result {
            FetchResult::Page {
                content_type, body, ..
            } => {
                let links = if is_html(content_type.as_deref()) {
                    extract_links(&String::from_utf8_lossy(&body), &queued.url)
                } else {
                    Vec::new()
                };

                self.observer
                    .on_page_visited(url_str, &body, content_type.as_deref(), &links);
                self.counters.pages_visited.fetch_add(1, Ordering::Relaxed);

                self.offer_links(queued, &links, queued.depth + 1).await;
            }

            FetchResult::Redirect { location, .. } => {
                if !self.config.crawl.follow_redirects {
                    return;
                }
                match location.and_then(|l| resolve_link(&l, &queued.url)) {
                    // The target inherits the depth of the redirecting URL
                    Some(target) => self.offer_links(queued, &[target], queued.depth).await,
                    None => tracing::debug!("Redirect from {} has no usable Location", url_str),
                }
            }

            FetchResult::TooLarge { limit, .. } => {
                tracing::info!("Skipping {}: body larger than {} bytes", url_str, limit);
                self.counters.oversized.fetch_add(1, Ordering::Relaxed);
            }

            FetchResult::HttpError { .. } => {}

            FetchResult::NetworkError { error } => {
                tracing::warn!("Fetch failed for {}: {}", url_str, error);
                self.counters.network_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Offers unseen links to the observer and schedules the admitted ones
    ///
    /// Links already scheduled, and links past the depth limit, are not
    /// offered at all.
    async fn offer_links(&self, from: &QueuedUrl, links: &[String], depth: u32) {
        let mut scheduler = self.scheduler.lock().await;
        if !scheduler.accepts_depth(depth) {
            return;
        }

        for link in links {
            if scheduler.is_scheduled(link) {
                continue;
            }

            let candidate = CandidateLink::new(link.as_str(), from.url.as_str());
            if !self.observer.should_visit(&candidate) {
                continue;
            }

            match Url::parse(link) {
                Ok(url) => {
                    scheduler.schedule(url, depth);
                }
                Err(e) => tracing::debug!("Failed to parse link {}: {}", link, e),
            }
        }
    }

    /// Checks robots.txt for a URL and records its crawl delay
    async fn robots_allow(&self, queued: &QueuedUrl) -> bool {
        let agent = &self.config.user_agent.crawler_name;
        let robots = robots_for(&self.client, &self.robots, &queued.url).await;

        if let Some(delay) = robots
            .crawl_delay(agent)
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        {
            self.scheduler
                .lock()
                .await
                .set_crawl_delay(&origin_of(&queued.url), delay);
        }

        robots.is_allowed(queued.url.as_str(), agent)
    }
}

/// Runs a crawl, reporting every event to `observer`
///
/// # Example
///
/// ```no_run
/// use crawl_tally::config::load_config;
/// use crawl_tally::crawler::run_crawl;
/// use crawl_tally::CrawlJob;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let job = Arc::new(CrawlJob::new(&config.crawl.root_url));
/// run_crawl(config, job.clone()).await?;
/// println!("{} URLs discovered", job.snapshot().discoveries.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, observer: Arc<dyn CrawlObserver>) -> Result<CrawlSummary> {
    Coordinator::new(config, observer)?.run().await
}
