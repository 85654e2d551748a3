//! Crawl engine integration
//!
//! The crawl engine never touches the store directly; it talks to a
//! [`CrawlObserver`], so any engine (the bundled one, a test harness replaying
//! a synthetic event trace, or a different crawler) can drive a job.

use crate::observe::records::CandidateLink;
use crate::observe::snapshot::Snapshot;
use crate::observe::store::ObservationStore;
use crate::scope::ScopeClassifier;
use std::sync::Arc;

/// Callbacks a crawl engine invokes from its worker threads
///
/// Implementations must be thread-safe and must never panic: one bad event
/// cannot be allowed to take down a worker.
pub trait CrawlObserver: Send + Sync {
    /// Scope predicate for a discovered link
    fn should_visit(&self, candidate: &CandidateLink) -> bool;

    /// Called for every fetch that produced an HTTP status
    fn on_fetch_attempt(&self, url: &str, status_code: u16, status_description: &str);

    /// Called for every fetched page whose body was parsed
    fn on_page_visited(
        &self,
        url: &str,
        content: &[u8],
        content_type: Option<&str>,
        outgoing_links: &[String],
    );
}

/// State of a single crawl: the scope gate and its observation store
///
/// Several jobs can live in one process; nothing here is global.
#[derive(Debug)]
pub struct CrawlJob {
    root_url: String,
    classifier: ScopeClassifier,
    store: Arc<ObservationStore>,
}

impl CrawlJob {
    /// Creates a job scoped to `root_url` with an empty store
    pub fn new(root_url: &str) -> Self {
        Self::with_store(root_url, Arc::new(ObservationStore::new()))
    }

    /// Creates a job recording into an existing store
    pub fn with_store(root_url: &str, store: Arc<ObservationStore>) -> Self {
        Self {
            root_url: root_url.to_string(),
            classifier: ScopeClassifier::new(root_url),
            store,
        }
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    /// Number of image URLs the scope gate has seen
    pub fn images_seen(&self) -> u64 {
        self.classifier.images_seen()
    }

    /// Freezes the observations for reporting
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }
}

impl CrawlObserver for CrawlJob {
    fn should_visit(&self, candidate: &CandidateLink) -> bool {
        self.classifier.should_visit(candidate, &self.store).visit
    }

    fn on_fetch_attempt(&self, url: &str, status_code: u16, status_description: &str) {
        tracing::debug!("Fetched: {} - Status: {} {}", url, status_code, status_description);
        self.store.record_fetch_attempt(url, status_code);
    }

    fn on_page_visited(
        &self,
        url: &str,
        content: &[u8],
        content_type: Option<&str>,
        outgoing_links: &[String],
    ) {
        let content_type = content_type.unwrap_or_default();
        tracing::debug!(
            "Visited: {} ({} bytes, {} outlinks, {})",
            url,
            content.len(),
            outgoing_links.len(),
            content_type
        );
        self.store.record_visit(
            url,
            content.len() as u64,
            outgoing_links.len() as u64,
            content_type,
        );
    }
}
