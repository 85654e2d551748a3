//! Record types held by the observation store

/// A link offered by the crawl engine for a scope decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// The discovered URL
    pub url: String,

    /// The page the link was found on
    pub referring_page_url: String,
}

impl CandidateLink {
    pub fn new(url: impl Into<String>, referring_page_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referring_page_url: referring_page_url.into(),
        }
    }
}

/// Metadata of a successfully visited page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    /// Size of the downloaded body in bytes
    pub size_bytes: u64,

    /// Number of outgoing links the parser extracted
    pub outlink_count: u64,

    /// Content-Type with parameters stripped
    pub content_type: String,
}

impl VisitRecord {
    /// Builds a record, normalizing the raw Content-Type header value
    pub fn new(size_bytes: u64, outlink_count: u64, content_type: &str) -> Self {
        Self {
            size_bytes,
            outlink_count,
            content_type: normalize_content_type(content_type),
        }
    }
}

/// Strips Content-Type parameters such as `charset`
///
/// # Examples
///
/// ```
/// use crawl_tally::observe::normalize_content_type;
///
/// assert_eq!(normalize_content_type("text/html; charset=utf-8"), "text/html");
/// assert_eq!(normalize_content_type("image/png"), "image/png");
/// ```
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_string()
}

/// HTTP status codes counted as successful fetches
pub fn is_success_status(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}
