//! crawl-tally: crawl observation and reporting
//!
//! This crate watches a web crawl, decides which discovered links are in scope,
//! records every fetch attempt and page visit from many concurrent workers,
//! and turns the result into CSV exports and a text report.

pub mod config;
pub mod crawler;
pub mod observe;
pub mod report;
pub mod robots;
pub mod scope;

use thiserror::Error;

/// Main error type for crawl-tally operations
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Crawl worker failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl-tally operations
pub type Result<T> = std::result::Result<T, TallyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome};
pub use observe::{CandidateLink, CrawlJob, CrawlObserver, ObservationStore, Snapshot};
pub use report::{generate, write_report, ReportContext};
pub use scope::{classify, ScopeClassifier, ScopeDecision};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: TallyError =
            ConfigError::Validation("threads must be between 1 and 64".into()).into();
        assert!(matches!(err, TallyError::Config(ConfigError::Validation(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation error: threads must be between 1 and 64"
        );
    }

    #[test]
    fn test_url_parse_error_converts() {
        fn parse(raw: &str) -> Result<::url::Url> {
            Ok(::url::Url::parse(raw)?)
        }

        let err = parse("not a url").unwrap_err();
        assert!(matches!(err, TallyError::UrlParse(_)));
        assert!(err.to_string().starts_with("URL parse error: "));
    }
}
