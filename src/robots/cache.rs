//! Per-origin robots.txt cache
//!
//! Each origin is fetched at most once per crawl. Concurrent workers asking
//! for the same origin while the first fetch is in flight may fetch it again;
//! the last result wins, which is harmless.

use crate::robots::ParsedRobots;
use dashmap::DashMap;
use std::sync::Arc;

/// Parsed robots.txt rules keyed by origin (`scheme://host:port`)
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: DashMap<String, Arc<ParsedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rules for an origin, if any
    pub fn get(&self, origin: &str) -> Option<Arc<ParsedRobots>> {
        self.entries.get(origin).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores the rules for an origin and returns the shared copy
    pub fn insert(&self, origin: &str, robots: ParsedRobots) -> Arc<ParsedRobots> {
        let robots = Arc::new(robots);
        self.entries.insert(origin.to_string(), Arc::clone(&robots));
        robots
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
