//! Concurrent observation store
//!
//! Worker threads record discoveries, fetch attempts and visits here while the
//! crawl is running. Each map is sharded (`DashMap`), so writers for unrelated
//! URLs never contend on one lock.

use crate::observe::records::VisitRecord;
use crate::observe::snapshot::Snapshot;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe accumulation of crawl observations, keyed by URL
#[derive(Debug, Default)]
pub struct ObservationStore {
    discoveries: DashMap<String, bool>,
    fetches: DashMap<String, u16>,
    visits: DashMap<String, VisitRecord>,
    rejected: AtomicU64,
}

impl ObservationStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `url` was seen as a link candidate
    ///
    /// Repeated discoveries of the same URL overwrite the flag, which is
    /// always the same value for a given root.
    ///
    /// Returns false if the URL was rejected as malformed.
    pub fn record_discovery(&self, url: &str, in_domain: bool) -> bool {
        let Some(key) = self.accept_key(url, "discovery") else {
            return false;
        };
        self.discoveries.insert(key, in_domain);
        true
    }

    /// Records the status code of a fetch attempt; the last status wins
    pub fn record_fetch_attempt(&self, url: &str, status_code: u16) -> bool {
        let Some(key) = self.accept_key(url, "fetch attempt") else {
            return false;
        };
        self.fetches.insert(key, status_code);
        true
    }

    /// Records a successful page visit
    ///
    /// `content_type` is normalized before storage (parameters stripped).
    pub fn record_visit(
        &self,
        url: &str,
        size_bytes: u64,
        outlink_count: u64,
        content_type: &str,
    ) -> bool {
        let Some(key) = self.accept_key(url, "visit") else {
            return false;
        };
        self.visits
            .insert(key, VisitRecord::new(size_bytes, outlink_count, content_type));
        true
    }

    /// Number of recording calls rejected for a missing URL
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn discovery_count(&self) -> usize {
        self.discoveries.len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.len()
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    /// Copies the three maps into an immutable snapshot
    ///
    /// Every write that completed before this call is included. The three
    /// maps are copied one after another, so writes racing with the call may
    /// appear in one map but not another; take the snapshot after the crawl
    /// workers have stopped.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            fetches: self
                .fetches
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
            visits: self
                .visits
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            discoveries: self
                .discoveries
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
        }
    }

    /// Consumes the store without copying the entries
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            fetches: self.fetches.into_iter().collect(),
            visits: self.visits.into_iter().collect(),
            discoveries: self.discoveries.into_iter().collect(),
        }
    }

    fn accept_key(&self, url: &str, kind: &str) -> Option<String> {
        if url.trim().is_empty() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Ignoring {} with empty URL", kind);
            return None;
        }
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_store_is_empty() {
        let store = ObservationStore::new();
        assert_eq!(store.discovery_count(), 0);
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(store.visit_count(), 0);
        assert_eq!(store.rejected_count(), 0);
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let store = ObservationStore::new();
        assert!(store.record_discovery("https://example.com/a", true));
        assert!(store.record_discovery("https://example.com/a", true));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.discoveries.len(), 1);
        assert_eq!(snapshot.discoveries.get("https://example.com/a"), Some(&true));
    }

    #[test]
    fn test_last_fetch_status_wins() {
        let store = ObservationStore::new();
        store.record_fetch_attempt("https://example.com/a", 301);
        store.record_fetch_attempt("https://example.com/a", 200);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.fetches.len(), 1);
        assert_eq!(snapshot.fetches.get("https://example.com/a"), Some(&200));
    }

    #[test]
    fn test_visit_normalizes_content_type() {
        let store = ObservationStore::new();
        store.record_visit("https://example.com/a", 1234, 7, "text/html; charset=UTF-8");

        let snapshot = store.snapshot();
        let visit = snapshot.visits.get("https://example.com/a").unwrap();
        assert_eq!(visit.size_bytes, 1234);
        assert_eq!(visit.outlink_count, 7);
        assert_eq!(visit.content_type, "text/html");
    }

    #[test]
    fn test_empty_urls_rejected_without_side_effect() {
        let store = ObservationStore::new();
        assert!(!store.record_discovery("", true));
        assert!(!store.record_fetch_attempt("   ", 200));
        assert!(!store.record_visit("", 10, 0, "text/html"));

        assert_eq!(store.rejected_count(), 3);
        assert_eq!(store.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_visit_without_discovery_is_kept() {
        let store = ObservationStore::new();
        store.record_visit("https://example.com/orphan", 10, 0, "text/html");
        assert_eq!(store.visit_count(), 1);
        assert_eq!(store.discovery_count(), 0);
    }

    #[test]
    fn test_into_snapshot_matches_snapshot() {
        let store = ObservationStore::new();
        store.record_discovery("https://example.com/a", true);
        store.record_fetch_attempt("https://example.com/a", 200);
        store.record_visit("https://example.com/a", 10, 1, "text/html");

        let copied = store.snapshot();
        let moved = store.into_snapshot();
        assert_eq!(copied, moved);
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let store = Arc::new(ObservationStore::new());
        let threads = 8;
        let per_thread = 500;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..per_thread {
                        let url = format!("https://example.com/{}/{}", t, i);
                        store.record_discovery(&url, i % 2 == 0);
                        store.record_fetch_attempt(&url, 200);
                        store.record_visit(&url, i as u64, 1, "text/html");
                        // Shared key hammered by every thread
                        store.record_discovery("https://example.com/shared", true);
                    }
                });
            }
        });

        let expected = threads * per_thread;
        assert_eq!(store.discovery_count(), expected + 1);
        assert_eq!(store.fetch_count(), expected);
        assert_eq!(store.visit_count(), expected);
    }
}
