//! Scope classification for candidate links
//!
//! Decides whether a discovered URL belongs to the crawl (prefix match against
//! the root URL) and whether its apparent file type may be fetched.

mod extension;

pub use extension::{file_kind, Extension, FileKind};

use crate::observe::{CandidateLink, ObservationStore};
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a scope decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDecision {
    /// The crawl engine should fetch the URL
    pub visit: bool,

    /// The URL has the root URL as a case-insensitive prefix
    pub in_domain: bool,

    /// Apparent file type of the URL
    pub kind: FileKind,
}

/// Classifies a URL against a crawl root
///
/// This is a pure, total function: any string is accepted, and a URL that
/// does not start with the root (including any malformed string) is simply
/// out of domain. An empty root matches nothing.
///
/// # Examples
///
/// ```
/// use crawl_tally::scope::classify;
///
/// let root = "https://www.nytimes.com";
///
/// let world = classify("https://www.nytimes.com/section/world", root);
/// assert!(world.in_domain && world.visit);
///
/// let ads = classify("https://ads.nytimes.com/x", root);
/// assert!(!ads.in_domain && !ads.visit);
///
/// let css = classify("https://www.nytimes.com/style.css", root);
/// assert!(css.in_domain && !css.visit);
/// ```
pub fn classify(url: &str, root_url: &str) -> ScopeDecision {
    classify_lowered(url, &root_url.to_lowercase())
}

fn classify_lowered(url: &str, root_lower: &str) -> ScopeDecision {
    let in_domain = !root_lower.is_empty() && url.to_lowercase().starts_with(root_lower);
    let kind = file_kind(url);

    ScopeDecision {
        visit: in_domain && kind.is_admitted(),
        in_domain,
        kind,
    }
}

/// Scope gate for one crawl job
///
/// Wraps [`classify`] with the side effects the crawl needs: every decision
/// records a discovery in the observation store, and image URLs bump a
/// crawl-lifetime counter whatever the outcome.
#[derive(Debug)]
pub struct ScopeClassifier {
    root_lower: String,
    images_seen: AtomicU64,
}

impl ScopeClassifier {
    /// Creates a classifier for the given root URL
    pub fn new(root_url: &str) -> Self {
        Self {
            root_lower: root_url.to_lowercase(),
            images_seen: AtomicU64::new(0),
        }
    }

    /// Decides on a candidate link and records its discovery
    pub fn should_visit(&self, candidate: &CandidateLink, store: &ObservationStore) -> ScopeDecision {
        let decision = classify_lowered(&candidate.url, &self.root_lower);

        store.record_discovery(&candidate.url, decision.in_domain);

        if decision.kind.is_image() {
            self.images_seen.fetch_add(1, Ordering::Relaxed);
        }

        tracing::trace!(
            url = %candidate.url,
            referrer = %candidate.referring_page_url,
            in_domain = decision.in_domain,
            visit = decision.visit,
            "Scope decision"
        );

        decision
    }

    /// Number of image URLs seen so far
    pub fn images_seen(&self) -> u64 {
        self.images_seen.load(Ordering::Relaxed)
    }
}
