//! Report module for turning a crawl snapshot into output files
//!
//! This module handles:
//! - Computing aggregate statistics (fetch totals, link totals, histograms)
//! - Rendering the three CSV exports and the text report
//! - Writing everything to the output directory

mod csv_export;
pub mod stats;
mod text;

pub use csv_export::{
    read_fetch_csv, read_snapshot, read_urls_csv, read_visit_csv, write_fetch_csv,
    write_urls_csv, write_visit_csv,
};
pub use stats::{status_label, CrawlStatistics, SizeBucket};
pub use text::format_text_report;

use crate::config::Config;
use crate::observe::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while producing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed export: {0}")]
    Format(String),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Crawl metadata printed in the report header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Site label, e.g. `nytimes.com`
    pub site_label: String,

    /// Crawl parallelism; informational only
    pub threads: u32,

    pub name: Option<String>,
    pub id: Option<String>,
}

/// Header fields supplied after the crawl, each replacing the base value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextOverrides {
    pub site_label: Option<String>,
    pub threads: Option<u32>,
    pub name: Option<String>,
    pub id: Option<String>,
}

impl ReportContext {
    /// A header with no identification lines
    pub fn new(site_label: impl Into<String>, threads: u32) -> Self {
        Self {
            site_label: site_label.into(),
            threads,
            name: None,
            id: None,
        }
    }

    /// Replaces every field the overrides set
    pub fn with_overrides(self, overrides: ContextOverrides) -> Self {
        Self {
            site_label: overrides.site_label.unwrap_or(self.site_label),
            threads: overrides.threads.unwrap_or(self.threads),
            name: overrides.name.or(self.name),
            id: overrides.id.or(self.id),
        }
    }

    /// Builds the report header from the crawl configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            site_label: config.crawl.label().to_string(),
            threads: config.crawl.threads,
            name: config.report.name.clone(),
            id: config.report.id.clone(),
        }
    }
}

/// The rendered exports and report for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub fetch_csv: String,
    pub visit_csv: String,
    pub urls_csv: String,
    pub text: String,
    pub statistics: CrawlStatistics,
}

/// Paths of the files written by [`write_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub fetch_csv: PathBuf,
    pub visit_csv: PathBuf,
    pub urls_csv: PathBuf,
    pub text: PathBuf,
}

impl ReportPaths {
    /// File names used for a site: `fetch_<site>.csv`, `visit_<site>.csv`,
    /// `urls_<site>.csv` and `CrawlReport_<site>.txt`
    pub fn for_site(directory: &Path, site: &str) -> Self {
        Self {
            fetch_csv: directory.join(format!("fetch_{}.csv", site)),
            visit_csv: directory.join(format!("visit_{}.csv", site)),
            urls_csv: directory.join(format!("urls_{}.csv", site)),
            text: directory.join(format!("CrawlReport_{}.txt", site)),
        }
    }
}

/// Renders every export and the text report for a snapshot
///
/// Pure: the same snapshot and context always produce identical output.
pub fn generate(snapshot: &Snapshot, context: &ReportContext) -> ReportResult<GeneratedReport> {
    let statistics = CrawlStatistics::from_snapshot(snapshot);

    Ok(GeneratedReport {
        fetch_csv: csv_export::render(|buf| write_fetch_csv(snapshot, buf))?,
        visit_csv: csv_export::render(|buf| write_visit_csv(snapshot, buf))?,
        urls_csv: csv_export::render(|buf| write_urls_csv(snapshot, buf))?,
        text: format_text_report(&statistics, context),
        statistics,
    })
}

/// Writes a generated report to `directory`, creating it if needed
///
/// Nothing is retried; on failure the caller still holds the report and may
/// try again.
///
/// # Returns
///
/// * `Ok(ReportPaths)` - Where each file was written
/// * `Err(ReportError)` - The first file that could not be written
pub fn write_report(
    report: &GeneratedReport,
    directory: &Path,
    site: &str,
) -> ReportResult<ReportPaths> {
    fs::create_dir_all(directory).map_err(|source| ReportError::Write {
        path: directory.to_path_buf(),
        source,
    })?;

    let paths = ReportPaths::for_site(directory, site);

    for (path, contents) in [
        (&paths.fetch_csv, &report.fetch_csv),
        (&paths.visit_csv, &report.visit_csv),
        (&paths.urls_csv, &report.urls_csv),
        (&paths.text, &report.text),
    ] {
        fs::write(path, contents).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Wrote {}", path.display());
    }

    tracing::info!(
        "Report written to {} ({} fetches, {} visits, {} URLs)",
        directory.display(),
        report.statistics.fetch.attempted,
        report.statistics.sizes.total(),
        report.statistics.links.unique_extracted
    );

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::VisitRecord;

    fn context() -> ReportContext {
        ReportContext {
            site_label: "example.com".to_string(),
            threads: 3,
            name: None,
            id: None,
        }
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot
            .fetches
            .insert("https://example.com/".to_string(), 200);
        snapshot.visits.insert(
            "https://example.com/".to_string(),
            VisitRecord::new(2048, 4, "text/html"),
        );
        snapshot
            .discoveries
            .insert("https://example.com/".to_string(), true);
        snapshot
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let base = ReportContext {
            name: Some("Jane Doe".to_string()),
            id: Some("42".to_string()),
            ..context()
        };

        let unchanged = base.clone().with_overrides(ContextOverrides::default());
        assert_eq!(unchanged, base);

        let merged = base.with_overrides(ContextOverrides {
            threads: Some(7),
            id: Some("1234".to_string()),
            ..ContextOverrides::default()
        });
        assert_eq!(merged.site_label, "example.com");
        assert_eq!(merged.threads, 7);
        assert_eq!(merged.name.as_deref(), Some("Jane Doe"));
        assert_eq!(merged.id.as_deref(), Some("1234"));
    }

    #[test]
    fn test_context_from_config_with_overrides() {
        let config = crate::config::parse_config(
            r#"
[crawl]
root-url = "https://www.nytimes.com"
site-name = "nytimes"
site-label = "nytimes.com"
threads = 7

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
directory = "out"

[report]
name = "Jane Doe"
id = "42"
"#,
        )
        .unwrap();

        let context = ReportContext::from_config(&config).with_overrides(ContextOverrides {
            name: Some("John Roe".to_string()),
            ..ContextOverrides::default()
        });
        let report = generate(&snapshot(), &context).unwrap();
        assert!(report.text.starts_with(
            "Name: John Roe\nID: 42\nNews site crawled: nytimes.com\nNumber of threads: 7\n"
        ));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = generate(&snapshot(), &context()).unwrap();
        let second = generate(&snapshot(), &context()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_contents() {
        let report = generate(&snapshot(), &context()).unwrap();
        assert_eq!(report.fetch_csv, "URL,Status\nhttps://example.com/,200\n");
        assert!(report.text.contains("Number of threads: 3\n"));
        assert!(report.text.contains("1KB ~ <10KB: 1\n"));
        assert_eq!(report.statistics.links.total_extracted, 4);
    }

    #[test]
    fn test_paths_for_site() {
        let paths = ReportPaths::for_site(Path::new("/out"), "nytimes");
        assert_eq!(paths.fetch_csv, Path::new("/out/fetch_nytimes.csv"));
        assert_eq!(paths.visit_csv, Path::new("/out/visit_nytimes.csv"));
        assert_eq!(paths.urls_csv, Path::new("/out/urls_nytimes.csv"));
        assert_eq!(paths.text, Path::new("/out/CrawlReport_nytimes.txt"));
    }

    #[test]
    fn test_write_report_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out");
        let report = generate(&snapshot(), &context()).unwrap();

        let paths = write_report(&report, &target, "example").unwrap();

        assert_eq!(fs::read_to_string(&paths.fetch_csv).unwrap(), report.fetch_csv);
        assert_eq!(fs::read_to_string(&paths.visit_csv).unwrap(), report.visit_csv);
        assert_eq!(fs::read_to_string(&paths.urls_csv).unwrap(), report.urls_csv);
        assert_eq!(fs::read_to_string(&paths.text).unwrap(), report.text);
    }

    #[test]
    fn test_write_report_surfaces_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let report = generate(&snapshot(), &context()).unwrap();
        let result = write_report(&report, &blocker, "example");

        assert!(matches!(result, Err(ReportError::Write { .. })));
    }
}
