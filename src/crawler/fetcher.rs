//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent
//! - GET requests for listing and asset pages (text)
//! - GET requests for asset payloads (bytes)
//!
//! Failures are returned, never retried here. A failed fetch ends the run
//! and the checkpoint/restart cycle acts as the retry.

use crate::config::UserAgentConfig;
use crate::MirrorError;
use reqwest::{redirect::Policy, Client, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against this
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed per request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_mirror::config::UserAgentConfig;
/// use sumi_mirror::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiMirror".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page
///
/// # Returns
///
/// * `Ok(FetchedPage)` - 2xx response with its decoded body
/// * `Err(MirrorError::HttpStatus)` - Non-success status
/// * `Err(MirrorError::Http)` - Network, timeout, or body decode failure
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, MirrorError> {
    let response = send(client.get(url), url).await?;
    let final_url = response.url().clone();
    let status_code = response.status().as_u16();

    let body = response.text().await.map_err(|source| MirrorError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchedPage {
        final_url,
        status_code,
        body,
    })
}

/// Fetches a binary payload in full
///
/// `timeout` replaces the client's page timeout for this request and covers
/// the whole body transfer.
pub async fn fetch_bytes(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, MirrorError> {
    let response = send(client.get(url).timeout(timeout), url).await?;

    let bytes = response.bytes().await.map_err(|source| MirrorError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(bytes.to_vec())
}

/// Sends a GET and rejects non-success statuses
async fn send(request: RequestBuilder, url: &str) -> Result<Response, MirrorError> {
    let response = request
        .send()
        .await
        .map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}
