//! Robots.txt handling module
//!
//! This module fetches, parses, and caches robots.txt files for the bundled
//! crawl engine.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Returns the cache key for a URL: `scheme://host[:port]`
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Fetches robots.txt for an origin
///
/// Anything other than a 2xx answer, and any network error, means there are
/// no rules to honour.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Origin serialization, e.g. `https://example.com`
///
/// # Returns
///
/// The parsed rules, or [`ParsedRobots::allow_all`] when unavailable
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Could not fetch {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!("{} answered {}; allowing all", robots_url, response.status());
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded {} ({} bytes)", robots_url, body.len());
            ParsedRobots::from_content(&body)
        }
        Err(e) => {
            tracing::debug!("Could not read {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Returns the rules for a URL's origin, fetching them on first use
pub async fn robots_for(client: &Client, cache: &RobotsCache, url: &Url) -> Arc<ParsedRobots> {
    let origin = origin_of(url);
    if let Some(robots) = cache.get(&origin) {
        return robots;
    }

    let robots = fetch_robots(client, &origin).await;
    cache.insert(&origin, robots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        let url = Url::parse("https://Example.com/a/b?c=d").unwrap();
        assert_eq!(origin_of(&url), "https://example.com");

        let url = Url::parse("http://localhost:8080/x").unwrap();
        assert_eq!(origin_of(&url), "http://localhost:8080");
    }
}
