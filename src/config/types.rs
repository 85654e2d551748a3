use serde::Deserialize;

/// Main configuration structure for a crawl-tally job
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Crawl job configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Root URL; defines the in-domain prefix and is always seeded
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Short site name used in output file names (`fetch_<site>.csv`)
    #[serde(rename = "site-name")]
    pub site_name: String,

    /// Human-readable site label printed in the report
    #[serde(rename = "site-label", default)]
    pub site_label: Option<String>,

    /// Number of parallel crawl workers
    pub threads: u32,

    /// Maximum link depth from the seeds
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages to fetch
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// Connect and read timeout (milliseconds)
    #[serde(rename = "connection-timeout", default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Largest response body read in full (bytes); bigger pages are not visited
    #[serde(rename = "max-download-size", default = "default_max_download_size")]
    pub max_download_size: u64,

    /// Offer redirect targets back to the scope classifier
    #[serde(rename = "follow-redirects", default = "default_true")]
    pub follow_redirects: bool,

    /// Consult robots.txt before fetching
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Additional seed URLs
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl CrawlConfig {
    /// Label shown in the report, falling back to the site name
    pub fn label(&self) -> &str {
        self.site_label.as_deref().unwrap_or(&self.site_name)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the CSV exports and the text report
    #[serde(default = "default_directory")]
    pub directory: String,
}

/// Optional identification lines at the top of the text report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    pub name: Option<String>,
    pub id: Option<String>,
}

fn default_max_depth() -> u32 {
    16
}

fn default_max_pages() -> u32 {
    20_000
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_connection_timeout() -> u64 {
    10_000
}

fn default_max_download_size() -> u64 {
    1_048_576
}

fn default_true() -> bool {
    true
}

fn default_directory() -> String {
    ".".to_string()
}
