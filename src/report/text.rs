//! Human-readable crawl report
//!
//! Sections always appear in the same order: fetch statistics, outgoing URLs,
//! status codes, file sizes, content types.

use crate::report::stats::{status_label, CrawlStatistics};
use crate::report::ReportContext;

/// Formats the text report
///
/// # Arguments
///
/// * `stats` - Aggregates computed from the snapshot
/// * `context` - Crawl metadata printed in the header
///
/// # Returns
///
/// The complete report, newline-terminated
pub fn format_text_report(stats: &CrawlStatistics, context: &ReportContext) -> String {
    let mut out = String::new();

    // Header
    if let Some(name) = &context.name {
        out.push_str(&format!("Name: {}\n", name));
    }
    if let Some(id) = &context.id {
        out.push_str(&format!("ID: {}\n", id));
    }
    out.push_str(&format!("News site crawled: {}\n", context.site_label));
    out.push_str(&format!("Number of threads: {}\n\n", context.threads));

    section(&mut out, "Fetch Statistics");
    out.push_str(&format!("# fetches attempted: {}\n", stats.fetch.attempted));
    out.push_str(&format!("# fetches succeeded: {}\n", stats.fetch.succeeded));
    out.push_str(&format!(
        "# fetches failed or aborted: {}\n\n",
        stats.fetch.failed
    ));

    section(&mut out, "Outgoing URLs:");
    out.push_str(&format!(
        "Total URLs extracted: {}\n",
        stats.links.total_extracted
    ));
    out.push_str(&format!(
        "# unique URLs extracted: {}\n",
        stats.links.unique_extracted
    ));
    out.push_str(&format!(
        "# unique URLs within News Site: {}\n",
        stats.links.unique_within_domain
    ));
    out.push_str(&format!(
        "# unique URLs outside News Site: {}\n\n",
        stats.links.unique_outside_domain
    ));

    section(&mut out, "Status Codes:");
    for (code, count) in &stats.status_codes {
        match status_label(*code) {
            Some(label) => out.push_str(&format!("{} {}: {}\n", code, label, count)),
            None => out.push_str(&format!("{}: {}\n", code, count)),
        }
    }
    out.push('\n');

    section(&mut out, "File Sizes:");
    for (bucket, count) in stats.sizes.iter() {
        out.push_str(&format!("{}: {}\n", bucket.label(), count));
    }
    out.push('\n');

    section(&mut out, "Content Types:");
    for (content_type, count) in &stats.content_types {
        out.push_str(&format!("{}: {}\n", content_type, count));
    }

    out
}

/// Writes a section header underlined with '=' of the same length
fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');
}
