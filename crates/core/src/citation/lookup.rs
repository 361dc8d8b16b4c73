//! Reference lookup: the JSON endpoint behind citation tooltips.
//!
//! Asking the library for a citation href returns `{"items": [{"content":
//! "<html fragment>"}]}`. The fragment is what a tooltip would display.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::fetch::{FetchConfig, build_client, map_send_error};
use crate::{Result, WolError};

/// Source of citation HTML fragments, keyed by link href.
#[allow(async_fn_in_trait)]
pub trait ReferenceLookup {
    /// Fetches the HTML fragment a citation link points to.
    async fn fetch_fragment(&self, href: &str) -> Result<String>;
}

impl<L: ReferenceLookup + ?Sized> ReferenceLookup for &L {
    async fn fetch_fragment(&self, href: &str) -> Result<String> {
        (**self).fetch_fragment(href).await
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    items: Vec<LookupItem>,
}

#[derive(Debug, Deserialize)]
struct LookupItem {
    #[serde(default)]
    content: String,
}

/// HTTP client for the library's reference lookup endpoint.
#[derive(Debug, Clone)]
pub struct WolClient {
    client: Client,
    base: Url,
    timeout: u64,
    accept_language: String,
}

impl WolClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let base = Url::parse(&config.lookup_base).map_err(|e| WolError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client: build_client(config)?,
            base,
            timeout: config.timeout,
            accept_language: config.accept_language.clone(),
        })
    }

    /// Resolves a citation href against the lookup base.
    ///
    /// Page links carry a language prefix (`/es/wol/bc/...`) that the
    /// lookup endpoint does not take, so everything before `/wol/` is
    /// dropped. Absolute hrefs are used as they are.
    pub fn lookup_url(&self, href: &str) -> Result<Url> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Url::parse(href).map_err(|e| WolError::InvalidUrl(e.to_string()));
        }

        let path = match href.find("/wol/") {
            Some(idx) => &href[idx + 1..],
            None => href.trim_start_matches('/'),
        };

        self.base.join(path).map_err(|e| WolError::InvalidUrl(e.to_string()))
    }
}

impl ReferenceLookup for WolClient {
    async fn fetch_fragment(&self, href: &str) -> Result<String> {
        let url = self.lookup_url(href)?;
        tracing::debug!(%url, "looking up citation");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", &self.accept_language)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?
            .error_for_status()?;

        let body: LookupResponse = response.json().await?;
        body.items
            .into_iter()
            .next()
            .map(|item| item.content)
            .ok_or_else(|| WolError::Lookup { href: href.to_string(), reason: "response has no items".to_string() })
    }
}

/// Removes every anchor element, text included, from an HTML fragment.
///
/// Looked-up fragments carry verse-number and cross-reference anchors that
/// would otherwise leak into the cited text.
pub fn strip_anchors(html: &str) -> Result<String> {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("a", |el| {
                el.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| WolError::HtmlParseError(e.to_string()))?;
    rewriter.end().map_err(|e| WolError::HtmlParseError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| WolError::HtmlParseError(e.to_string()))
}
