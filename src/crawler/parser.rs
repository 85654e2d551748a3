//! HTML link extraction
//!
//! Outgoing links are collected from every element that references another
//! resource, not only anchors, so images and frames show up as discoveries.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements and the attribute holding their target
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("area[href]", "href"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("iframe[src]", "src"),
    ("frame[src]", "src"),
    ("embed[src]", "src"),
    ("script[src]", "src"),
];

/// Returns true if a content type denotes an HTML document
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("html"))
        .unwrap_or(false)
}

/// Extracts the unique outgoing links of an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `href` of `<a>`, `<area>` and `<link>`
/// - `src` of `<img>`, `<iframe>`, `<frame>`, `<embed>` and `<script>`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that is not HTTP(S) after resolution
///
/// Relative links resolve against `<base href>` when present. Fragments are
/// dropped, and each URL is reported once, in document order.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the page was fetched from
///
/// # Example
///
/// ```
/// use crawl_tally::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page#top">Link</a><img src="logo.png">"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     extract_links(html, &base),
///     vec!["https://example.com/page", "https://example.com/logo.png"]
/// );
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base_url = document_base(&document, page_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (selector, attribute) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(target) = element.value().attr(attribute) else {
                continue;
            };
            if let Some(absolute_url) = resolve_link(target, &base_url) {
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// The URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a link target to an absolute URL without fragment
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(target: &str, base_url: &Url) -> Option<String> {
    let target = target.trim();

    if target.is_empty() || target.starts_with('#') {
        return None;
    }

    let lower = target.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(target).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(extract_links(html, &base_url()), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        </body></html>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_fragment_stripped() {
        let html = r##"<html><body><a href="/doc#part-2">Doc</a></body></html>"##;
        assert_eq!(extract_links(html, &base_url()), vec!["https://example.com/doc"]);
    }

    #[test]
    fn test_download_and_nofollow_links_kept() {
        let html = r#"<html><body>
            <a href="/file.pdf" download>Download</a>
            <a href="/page" rel="nofollow">Link</a>
        </body></html>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/file.pdf", "https://example.com/page"]
        );
    }

    #[test]
    fn test_resource_elements() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/style.css">
            <script src="/app.js"></script>
        </head><body>
            <img src="/logo.png">
            <iframe src="https://video.example.org/embed"></iframe>
            <map><area href="/region"></map>
        </body></html>"#;
        let links = extract_links(html, &base_url());

        assert_eq!(links.len(), 5);
        assert!(links.contains(&"https://example.com/style.css".to_string()));
        assert!(links.contains(&"https://example.com/app.js".to_string()));
        assert!(links.contains(&"https://example.com/logo.png".to_string()));
        assert!(links.contains(&"https://video.example.org/embed".to_string()));
        assert!(links.contains(&"https://example.com/region".to_string()));
    }

    #[test]
    fn test_duplicates_reported_once() {
        let html = r#"<html><body>
            <a href="/page1">One</a>
            <a href="https://example.com/page1">Again</a>
            <a href="/page1#bottom">And again</a>
            <a href="/page2">Two</a>
        </body></html>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://example.com/page1", "https://example.com/page2"]
        );
    }

    #[test]
    fn test_base_href_respected() {
        let html = r#"<html><head><base href="https://cdn.example.com/assets/"></head>
            <body><a href="pic.jpg">Pic</a></body></html>"#;
        assert_eq!(
            extract_links(html, &base_url()),
            vec!["https://cdn.example.com/assets/pic.jpg"]
        );
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(Some("text/html")));
        assert!(is_html(Some("text/html; charset=UTF-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("image/png")));
        assert!(!is_html(Some("application/pdf")));
        assert!(!is_html(None));
    }
}
