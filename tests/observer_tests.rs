//! Integration tests driving a crawl job with synthetic event traces
//!
//! No network: the tests play the part of the crawl engine and call the
//! observer callbacks directly, from many threads at once.

use crawl_tally::observe::{CandidateLink, CrawlJob, CrawlObserver};
use crawl_tally::report::{generate, read_snapshot, write_report, ReportContext};
use std::fs::File;
use std::sync::Arc;

const ROOT: &str = "https://www.nytimes.com";

fn context() -> ReportContext {
    ReportContext {
        site_label: "nytimes.com".to_string(),
        threads: 8,
        name: Some("Jane Doe".to_string()),
        id: Some("1234".to_string()),
    }
}

/// Replays what one worker would report for page `n`
fn replay_page(observer: &dyn CrawlObserver, n: usize) {
    let page = format!("{}/section/page-{}", ROOT, n);
    let links = vec![
        format!("{}/section/page-{}", ROOT, n + 1),
        format!("{}/images/photo-{}.jpg", ROOT, n),
        format!("https://www.nytimes.com/style-{}.css", n),
        "https://www.washingtonpost.com/".to_string(),
    ];

    observer.on_fetch_attempt(&page, if n % 10 == 0 { 404 } else { 200 }, "");
    if n % 10 != 0 {
        let body = vec![b'x'; n * 100];
        observer.on_page_visited(&page, &body, Some("text/html; charset=UTF-8"), &links);
    }
    for link in &links {
        observer.should_visit(&CandidateLink::new(link.as_str(), page.as_str()));
    }
}

#[test]
fn test_concurrent_trace_produces_consistent_report() {
    let job = Arc::new(CrawlJob::new(ROOT));
    let pages = 400;

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let job = Arc::clone(&job);
            scope.spawn(move || {
                for n in (worker..pages).step_by(8) {
                    replay_page(job.as_ref(), n);
                }
            });
        }
    });

    let snapshot = job.snapshot();
    assert_eq!(snapshot.fetches.len(), pages);
    assert_eq!(snapshot.visits.len(), pages - pages / 10);

    let report = generate(&snapshot, &context()).unwrap();
    let stats = &report.statistics;

    assert_eq!(stats.fetch.attempted, 400);
    assert_eq!(stats.fetch.succeeded, 360);
    assert_eq!(stats.fetch.failed, 40);
    assert_eq!(stats.links.total_extracted, 360 * 4);

    // page-1..=page-400, 400 photos, 400 stylesheets, one external site
    assert_eq!(stats.links.unique_extracted, 1201);
    assert_eq!(stats.links.unique_within_domain, 1200);
    assert_eq!(stats.links.unique_outside_domain, 1);
    assert_eq!(stats.sizes.total(), 360);
    assert_eq!(stats.content_types.get("text/html"), Some(&360));

    assert_eq!(job.images_seen(), 400);
    assert_eq!(job.store().rejected_count(), 0);
}

#[test]
fn test_exports_round_trip_through_files() {
    let job = CrawlJob::new(ROOT);
    for n in 1..=25 {
        replay_page(&job, n);
    }

    let snapshot = job.snapshot();
    let report = generate(&snapshot, &context()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = write_report(&report, dir.path(), "nytimes").unwrap();

    let rebuilt = read_snapshot(
        File::open(&paths.fetch_csv).unwrap(),
        File::open(&paths.visit_csv).unwrap(),
        File::open(&paths.urls_csv).unwrap(),
    )
    .unwrap();
    assert_eq!(rebuilt, snapshot);

    let regenerated = generate(&rebuilt, &context()).unwrap();
    assert_eq!(regenerated.text, std::fs::read_to_string(&paths.text).unwrap());
    assert!(regenerated
        .text
        .starts_with("Name: Jane Doe\nID: 1234\nNews site crawled: nytimes.com\n"));
}

#[test]
fn test_jobs_are_independent() {
    let news = CrawlJob::new(ROOT);
    let other = CrawlJob::new("https://www.washingtonpost.com");

    replay_page(&news, 1);
    other.on_fetch_attempt("https://www.washingtonpost.com/", 200, "OK");

    assert_eq!(news.snapshot().fetches.len(), 1);
    assert_eq!(other.snapshot().fetches.len(), 1);
    assert!(other.snapshot().discoveries.is_empty());
    assert_eq!(news.images_seen(), 1);
    assert_eq!(other.images_seen(), 0);
}

#[test]
fn test_blank_urls_counted_not_recorded() {
    let job = CrawlJob::new(ROOT);

    job.on_fetch_attempt("", 200, "OK");
    job.on_page_visited("  ", b"body", Some("text/html"), &[]);
    assert!(!job.should_visit(&CandidateLink::new("", ROOT)));

    let snapshot = job.snapshot();
    assert!(snapshot.is_empty());
    assert_eq!(job.store().rejected_count(), 3);
}
