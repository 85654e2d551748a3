//! Scheduler for managing the crawl frontier and politeness
//!
//! This module handles:
//! - Breadth-first ordering of URLs to crawl
//! - Scheduling each URL at most once per run
//! - Depth and page-count limits
//! - Per-origin politeness delays, raised by robots.txt crawl delays

use crate::config::CrawlConfig;
use crate::robots::origin_of;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};
use url::Url;

/// How long an idle worker waits before asking again while others are busy
const IDLE_POLL: Duration = Duration::from_millis(25);

/// A URL queued for fetching
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Politeness key, `scheme://host[:port]`
    pub origin: String,

    /// Link distance from the nearest seed
    pub depth: u32,

    /// Insertion order, for FIFO within a depth
    sequence: u64,
}

// Shallower URLs first, then first-come first-served
// (BinaryHeap is a max-heap, so the comparison is reversed)
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .cmp(&self.depth)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for QueuedUrl {}

/// What a worker should do next
#[derive(Debug)]
pub enum Next {
    /// Fetch this URL; its origin slot is already reserved
    Ready(QueuedUrl),

    /// Nothing is ready yet; ask again after this long
    Wait(Duration),

    /// The frontier is empty and no fetch is in flight
    Finished,
}

#[derive(Debug, Clone, Default)]
struct OriginState {
    next_request_at: Option<Instant>,
    crawl_delay: Option<Duration>,
}

/// Scheduler manages the frontier queue and per-origin rate limiting
///
/// The scheduler is shared by all workers behind an async mutex; every method
/// is synchronous and short.
#[derive(Debug)]
pub struct Scheduler {
    frontier: BinaryHeap<QueuedUrl>,

    /// Every URL ever queued
    scheduled: HashSet<String>,

    origins: HashMap<String, OriginState>,
    politeness_delay: Duration,
    max_depth: u32,
    max_pages: u64,

    /// URLs handed out and not yet completed
    in_flight: usize,

    sequence: u64,
}

impl Scheduler {
    /// Creates an empty scheduler
    ///
    /// # Arguments
    ///
    /// * `politeness_delay` - Minimum time between requests to one origin
    /// * `max_depth` - Deepest link distance that may be scheduled
    /// * `max_pages` - Total number of URLs that may ever be scheduled
    pub fn new(politeness_delay: Duration, max_depth: u32, max_pages: u64) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            scheduled: HashSet::new(),
            origins: HashMap::new(),
            politeness_delay,
            max_depth,
            max_pages,
            in_flight: 0,
            sequence: 0,
        }
    }

    /// Creates a scheduler from the crawl settings
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            Duration::from_millis(config.politeness_delay),
            config.max_depth,
            u64::from(config.max_pages),
        )
    }

    /// Queues a URL for fetching
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - Already scheduled, deeper than the limit, or the page
    ///   budget is spent
    pub fn schedule(&mut self, url: Url, depth: u32) -> bool {
        if !self.accepts_depth(depth) || self.budget_spent() {
            return false;
        }
        if !self.scheduled.insert(url.as_str().to_string()) {
            return false;
        }

        self.sequence += 1;
        let origin = origin_of(&url);
        tracing::trace!("Scheduled {} at depth {}", url, depth);
        self.frontier.push(QueuedUrl {
            url,
            origin,
            depth,
            sequence: self.sequence,
        });
        true
    }

    /// Returns true if a URL was ever queued
    pub fn is_scheduled(&self, url: &str) -> bool {
        self.scheduled.contains(url)
    }

    /// Returns true if links at `depth` may still be scheduled
    pub fn accepts_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    /// Returns true once `max_pages` URLs have been queued
    pub fn budget_spent(&self) -> bool {
        self.scheduled.len() as u64 >= self.max_pages
    }

    /// Picks the next URL whose origin may be contacted at `now`
    ///
    /// The returned URL counts as in flight until [`Scheduler::complete`] is
    /// called, and its origin is reserved for one politeness delay.
    pub fn next(&mut self, now: Instant) -> Next {
        if self.frontier.is_empty() {
            return if self.in_flight == 0 {
                Next::Finished
            } else {
                Next::Wait(IDLE_POLL)
            };
        }

        let mut not_ready = Vec::new();
        let mut found = None;

        while let Some(queued) = self.frontier.pop() {
            let ready = self
                .origins
                .get(&queued.origin)
                .and_then(|state| state.next_request_at)
                .map_or(true, |at| at <= now);

            if ready {
                found = Some(queued);
                break;
            }
            not_ready.push(queued);
        }

        for queued in not_ready {
            self.frontier.push(queued);
        }

        match found {
            Some(queued) => {
                let delay = self.delay_for(&queued.origin);
                self.origins
                    .entry(queued.origin.clone())
                    .or_default()
                    .next_request_at = Some(now + delay);
                self.in_flight += 1;
                Next::Ready(queued)
            }
            None => Next::Wait(self.minimum_wait(now)),
        }
    }

    /// Marks one handed-out URL as done
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Records a robots.txt crawl delay for an origin
    pub fn set_crawl_delay(&mut self, origin: &str, delay: Duration) {
        self.origins.entry(origin.to_string()).or_default().crawl_delay = Some(delay);
    }

    /// Effective delay for an origin: the larger of the configured politeness
    /// delay and the robots.txt crawl delay
    pub fn delay_for(&self, origin: &str) -> Duration {
        let robots_delay = self
            .origins
            .get(origin)
            .and_then(|state| state.crawl_delay)
            .unwrap_or(Duration::ZERO);
        std::cmp::max(self.politeness_delay, robots_delay)
    }

    /// Returns the number of URLs waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of URLs ever scheduled
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Time until the first queued origin becomes available
    fn minimum_wait(&self, now: Instant) -> Duration {
        self.frontier
            .iter()
            .filter_map(|queued| self.origins.get(&queued.origin)?.next_request_at)
            .map(|at| at.saturating_duration_since(now))
            .min()
            .unwrap_or(IDLE_POLL)
            .max(Duration::from_millis(1))
    }
}
