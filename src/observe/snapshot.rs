//! Frozen view of the observation store used for reporting

use crate::observe::records::{is_success_status, VisitRecord};
use std::collections::BTreeMap;

/// How many offending URLs an audit keeps per category
const AUDIT_SAMPLE: usize = 10;

/// Immutable copy of the three observation maps
///
/// Maps are ordered by URL so that every export produced from a snapshot is
/// byte-for-byte reproducible. The ordering itself carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// URL -> last observed status code
    pub fetches: BTreeMap<String, u16>,

    /// URL -> visit metadata
    pub visits: BTreeMap<String, VisitRecord>,

    /// URL -> in-domain flag
    pub discoveries: BTreeMap<String, bool>,
}

/// Violations of the record invariants found in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotAudit {
    /// Visits whose URL has no fetch record with a 2xx status
    pub visits_without_success: usize,

    /// Fetch records whose URL was never discovered
    pub fetches_without_discovery: usize,

    /// Visit records whose URL was never discovered
    pub visits_without_discovery: usize,

    /// Up to a handful of offending URLs across all categories
    pub samples: Vec<String>,
}

impl SnapshotAudit {
    /// Returns true if no invariant was violated
    pub fn is_clean(&self) -> bool {
        self.visits_without_success == 0
            && self.fetches_without_discovery == 0
            && self.visits_without_discovery == 0
    }
}

impl Snapshot {
    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty() && self.visits.is_empty() && self.discoveries.is_empty()
    }

    /// Checks the cross-map invariants
    ///
    /// The store accepts out-of-order or unexpected events; this reports them
    /// after the fact instead.
    pub fn audit(&self) -> SnapshotAudit {
        let mut audit = SnapshotAudit::default();

        for url in self.visits.keys() {
            let fetched_ok = self
                .fetches
                .get(url)
                .is_some_and(|status| is_success_status(*status));
            if !fetched_ok {
                audit.visits_without_success += 1;
                push_sample(&mut audit.samples, url);
            }
            if !self.discoveries.contains_key(url) {
                audit.visits_without_discovery += 1;
                push_sample(&mut audit.samples, url);
            }
        }

        for url in self.fetches.keys() {
            if !self.discoveries.contains_key(url) {
                audit.fetches_without_discovery += 1;
                push_sample(&mut audit.samples, url);
            }
        }

        audit
    }
}

fn push_sample(samples: &mut Vec<String>, url: &str) {
    if samples.len() < AUDIT_SAMPLE && !samples.iter().any(|s| s == url) {
        samples.push(url.to_string());
    }
}
