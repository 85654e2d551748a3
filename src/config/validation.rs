use crate::config::types::{Config, CrawlConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl job configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_http_url("root-url", &config.root_url)?;

    for seed in &config.seeds {
        validate_http_url("seed", seed)?;
    }

    validate_site_name(&config.site_name)?;

    if config.threads < 1 || config.threads > 64 {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and 64, got {}",
            config.threads
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.connection_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "connection-timeout must be >= 100ms, got {}ms",
            config.connection_timeout
        )));
    }

    if config.max_download_size < 1 {
        return Err(ConfigError::Validation(format!(
            "max-download-size must be >= 1, got {}",
            config.max_download_size
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

/// Site names end up in file names, so only a conservative character set is allowed
fn validate_site_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "site-name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "site-name may only contain ASCII letters, digits, '-', '_' and '.', got '{}'",
            name
        )));
    }

    if name.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "site-name cannot start with '.', got '{}'",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("root-url", "https://www.nytimes.com").is_ok());
        assert!(validate_http_url("root-url", "http://127.0.0.1:8080/news").is_ok());

        assert!(validate_http_url("root-url", "").is_err());
        assert!(validate_http_url("root-url", "nytimes.com").is_err());
        assert!(validate_http_url("root-url", "ftp://example.com/").is_err());
        assert!(validate_http_url("root-url", "mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_validate_site_name() {
        assert!(validate_site_name("nytimes").is_ok());
        assert!(validate_site_name("la-times_2").is_ok());
        assert!(validate_site_name("bbc.co.uk").is_ok());

        assert!(validate_site_name("").is_err());
        assert!(validate_site_name("../etc").is_err());
        assert!(validate_site_name("with space").is_err());
        assert!(validate_site_name("a/b").is_err());
        assert!(validate_site_name(".hidden").is_err());
    }
}
