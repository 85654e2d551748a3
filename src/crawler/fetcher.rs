//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests with manual redirect handling
//! - Classifying responses for the observer callbacks

use crate::config::{CrawlConfig, UserAgentConfig};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// 2xx response with its body
    Page {
        status_code: u16,
        status_description: String,
        /// Content-Type header value, verbatim
        content_type: Option<String>,
        body: Vec<u8>,
    },

    /// 3xx response; the target is not fetched here
    Redirect {
        status_code: u16,
        status_description: String,
        /// Location header value, possibly relative
        location: Option<String>,
    },

    /// 2xx response whose body exceeded the download limit; not visited
    TooLarge {
        status_code: u16,
        status_description: String,
        limit: u64,
    },

    /// Any other status
    HttpError {
        status_code: u16,
        status_description: String,
    },

    /// No status was received (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Status code and description, when the server answered
    pub fn status(&self) -> Option<(u16, &str)> {
        match self {
            FetchResult::Page {
                status_code,
                status_description,
                ..
            }
            | FetchResult::Redirect {
                status_code,
                status_description,
                ..
            }
            | FetchResult::TooLarge {
                status_code,
                status_description,
                ..
            }
            | FetchResult::HttpError {
                status_code,
                status_description,
            } => Some((*status_code, status_description.as_str())),
            FetchResult::NetworkError { .. } => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client; the coordinator decides what
/// to do with a `Location`.
///
/// # Arguments
///
/// * `crawl` - Crawl settings (connection timeout)
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use crawl_tally::config::load_config;
/// use crawl_tally::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// let client = build_http_client(&config.crawl, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawl: &CrawlConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(crawl.connection_timeout);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// | Response | Result |
/// |----------|--------|
/// | 2xx | `Page`, body read in full |
/// | 2xx with a body over `max_bytes` | `TooLarge`, body dropped |
/// | 3xx | `Redirect`, body discarded |
/// | other status | `HttpError` |
/// | no response, or body read failed | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &Url, max_bytes: u64) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let status_code = status.as_u16();
    let status_description = describe(status);

    if status.is_redirection() {
        let location = header_value(&response, LOCATION);
        return FetchResult::Redirect {
            status_code,
            status_description,
            location,
        };
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code,
            status_description,
        };
    }

    let content_type = header_value(&response, CONTENT_TYPE);
    let declared = response.content_length().unwrap_or(0);
    let body = if declared > max_bytes {
        Ok(None)
    } else {
        read_capped(response, max_bytes).await
    };

    match body {
        Ok(Some(body)) => FetchResult::Page {
            status_code,
            status_description,
            content_type,
            body,
        },
        Ok(None) => FetchResult::TooLarge {
            status_code,
            status_description,
            limit: max_bytes,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

/// Reads the body chunk by chunk, giving up once it grows past `max_bytes`
async fn read_capped(
    mut response: Response,
    max_bytes: u64,
) -> Result<Option<Vec<u8>>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if (body.len() + chunk.len()) as u64 > max_bytes {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Some(body))
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn describe(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
