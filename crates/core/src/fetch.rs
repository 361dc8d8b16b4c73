//! Content fetching from URLs, files, and stdin.
//!
//! Article pages come from `wol.jw.org` over HTTP, or from a saved copy on
//! disk or piped through stdin. Solver input (scraped JSON) is read the same
//! way.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{Result, WolError};

/// Host every article URL must point at.
pub const WOL_HOST: &str = "wol.jw.org";

/// HTTP client configuration for article pages and reference lookups.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// `Accept-Language` sent with every request.
    pub accept_language: String,
    /// Base URL the reference lookup paths are resolved against.
    pub lookup_base: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "es-CR,es;q=0.9,en-US;q=0.8".to_string(),
            lookup_base: format!("https://{}/", WOL_HOST),
        }
    }
}

pub(crate) fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(WolError::HttpError)
}

pub(crate) fn map_send_error(err: reqwest::Error, timeout: u64) -> WolError {
    if err.is_timeout() { WolError::Timeout { timeout } } else { WolError::HttpError(err) }
}

/// Parses an article URL and checks that it points at the library host.
///
/// ```rust
/// use wolstudy_core::fetch::validate_article_url;
///
/// assert!(validate_article_url("https://wol.jw.org/es/wol/d/r4/lp-s/2024362").is_ok());
/// assert!(validate_article_url("https://example.com/article").is_err());
/// ```
pub fn validate_article_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| WolError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.host_str() != Some(WOL_HOST) {
        return Err(WolError::InvalidUrl(format!("{} doesn't point to {}", url, WOL_HOST)));
    }

    Ok(parsed)
}

/// Fetches an article page.
///
/// The URL must point at [`WOL_HOST`].
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = validate_article_url(url)?;
    let client = build_client(config)?;

    tracing::debug!(url = %parsed_url, "fetching article page");
    let response = client
        .get(parsed_url)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", &config.accept_language)
        .send()
        .await
        .map_err(|e| map_send_error(e, config.timeout))?
        .error_for_status()?;

    let content = response.text().await?;

    Ok(content)
}

/// Reads content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(WolError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(WolError::from)
    }
}

/// Reads content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(WolError::from)?;

    Ok(buffer)
}

/// Reads and deserializes a JSON file.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    tracing::debug!(path, "reading json");
    let data = fetch_file(path)?;
    let value = serde_json::from_str(&data)?;
    tracing::info!(path, "json data was read");
    Ok(value)
}

/// Reads and deserializes JSON piped through stdin.
pub fn read_json_stdin<T: serde::de::DeserializeOwned>() -> Result<T> {
    tracing::debug!("reading json from stdin");
    let data = fetch_stdin()?;
    Ok(serde_json::from_str(&data)?)
}
