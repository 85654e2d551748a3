//! Aggregate statistics computed from a crawl snapshot

use crate::observe::{is_success_status, Snapshot};
use std::collections::BTreeMap;

/// Reason phrases printed next to well-known status codes
const STATUS_LABELS: &[(u16, &str)] = &[
    (200, "OK"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (500, "Internal Server Error"),
];

/// Looks up the report label for a status code
///
/// Codes outside the table are reported numerically only.
pub fn status_label(code: u16) -> Option<&'static str> {
    STATUS_LABELS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

/// Fetch attempt totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStatistics {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Outgoing link totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatistics {
    /// Sum of outlink counts over all visited pages
    pub total_extracted: u64,

    /// Distinct discovered URLs
    pub unique_extracted: u64,

    pub unique_within_domain: u64,
    pub unique_outside_domain: u64,
}

/// Page size buckets; lower bounds inclusive, upper bounds exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeBucket {
    UnderOneKb,
    OneToTenKb,
    TenToHundredKb,
    HundredKbToOneMb,
    OneMbAndOver,
}

impl SizeBucket {
    /// All buckets in report order
    pub const ALL: [SizeBucket; 5] = [
        Self::UnderOneKb,
        Self::OneToTenKb,
        Self::TenToHundredKb,
        Self::HundredKbToOneMb,
        Self::OneMbAndOver,
    ];

    /// Places a size in its bucket; boundary values go to the upper bucket
    pub fn for_size(size_bytes: u64) -> Self {
        match size_bytes {
            0..=1023 => Self::UnderOneKb,
            1024..=10_239 => Self::OneToTenKb,
            10_240..=102_399 => Self::TenToHundredKb,
            102_400..=1_048_575 => Self::HundredKbToOneMb,
            _ => Self::OneMbAndOver,
        }
    }

    /// Label used in the text report
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderOneKb => "< 1KB",
            Self::OneToTenKb => "1KB ~ <10KB",
            Self::TenToHundredKb => "10KB ~ <100KB",
            Self::HundredKbToOneMb => "100KB ~ <1MB",
            Self::OneMbAndOver => ">= 1MB",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Counts of visited pages per size bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHistogram {
    counts: [u64; 5],
}

impl SizeHistogram {
    pub fn add(&mut self, size_bytes: u64) {
        self.counts[SizeBucket::for_size(size_bytes).index()] += 1;
    }

    pub fn get(&self, bucket: SizeBucket) -> u64 {
        self.counts[bucket.index()]
    }

    /// Buckets with their counts, in report order
    pub fn iter(&self) -> impl Iterator<Item = (SizeBucket, u64)> + '_ {
        SizeBucket::ALL.iter().map(|b| (*b, self.get(*b)))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Everything the text report prints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub fetch: FetchStatistics,
    pub links: LinkStatistics,

    /// Status code -> number of URLs whose last fetch returned it
    pub status_codes: BTreeMap<u16, u64>,

    pub sizes: SizeHistogram,

    /// Normalized content type -> number of visited pages
    pub content_types: BTreeMap<String, u64>,
}

impl CrawlStatistics {
    /// Computes all report statistics in one pass over each map
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut stats = Self::default();

        for status in snapshot.fetches.values() {
            *stats.status_codes.entry(*status).or_insert(0) += 1;
            if is_success_status(*status) {
                stats.fetch.succeeded += 1;
            }
        }
        stats.fetch.attempted = snapshot.fetches.len() as u64;
        stats.fetch.failed = stats.fetch.attempted - stats.fetch.succeeded;

        for visit in snapshot.visits.values() {
            stats.links.total_extracted += visit.outlink_count;
            stats.sizes.add(visit.size_bytes);
            *stats
                .content_types
                .entry(visit.content_type.clone())
                .or_insert(0) += 1;
        }

        stats.links.unique_extracted = snapshot.discoveries.len() as u64;
        stats.links.unique_within_domain =
            snapshot.discoveries.values().filter(|in_domain| **in_domain).count() as u64;
        stats.links.unique_outside_domain =
            stats.links.unique_extracted - stats.links.unique_within_domain;

        stats
    }
}
