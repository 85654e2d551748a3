//! Observation module for recording crawl events
//!
//! # Components
//!
//! - `ObservationStore`: sharded concurrent maps of discoveries, fetch attempts and visits
//! - `Snapshot`: the frozen, URL-ordered copy handed to the report generator
//! - `CrawlObserver` / `CrawlJob`: the narrow interface a crawl engine drives

mod observer;
mod records;
mod snapshot;
mod store;

pub use observer::{CrawlJob, CrawlObserver};
pub use records::{is_success_status, normalize_content_type, CandidateLink, VisitRecord};
pub use snapshot::{Snapshot, SnapshotAudit};
pub use store::ObservationStore;
