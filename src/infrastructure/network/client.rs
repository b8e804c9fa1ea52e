use crate::domain::error::{status_reason, FetchError};
use crate::domain::model::FetchedPage;
use crate::domain::traits::PageSource;
use crate::infrastructure::charset::decode_body;
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::network::headers::request_headers;
use crate::infrastructure::network::http::create_client;
use crate::infrastructure::network::pool::ConnectionLimiter;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

static SHARED: OnceCell<Fetcher> = OnceCell::new();

/// Pooled page fetcher
///
/// Cheap to clone; clones share the connection pool and slot limits.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<ConnectionLimiter>,
    config: Arc<ClientConfig>,
}

impl Fetcher {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let client = create_client(&config)?;
        let limiter = ConnectionLimiter::from_config(&config);

        Ok(Self {
            client,
            limiter: Arc::new(limiter),
            config: Arc::new(config),
        })
    }

    /// Process-wide fetcher with default settings, built on first use.
    ///
    /// Prefer constructing a `Fetcher` once and passing it around; this is
    /// for callers that have no handle to thread through.
    pub fn shared() -> Result<&'static Fetcher, FetchError> {
        SHARED.get_or_try_init(|| Fetcher::new(ClientConfig::default()))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn limiter(&self) -> &ConnectionLimiter {
        &self.limiter
    }

    /// Fetch a page and return its decoded body.
    ///
    /// Returns `None` on any failure. Everything except a non-HTTP input is
    /// logged once with the offending URL.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.fetch_page(url).await {
            Ok(page) => Some(page.into_body()),
            Err(e) if e.is_invalid_input() => None,
            Err(e) => {
                error!(url = %url, "{}", e);
                None
            }
        }
    }

    pub async fn fetch_opt(&self, url: Option<&str>) -> Option<String> {
        self.fetch(url?).await
    }

    /// Fetch a page, keeping the failure cause and the charset provenance.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = parse_target(url)?;

        let _permit = self.limiter.acquire(&target).await?;

        debug!(url = %target, "Sending GET request");
        let response = self
            .client
            .get(target)
            .headers(request_headers())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let code = status.as_u16();
            return Err(FetchError::Status {
                code,
                reason: status_reason(code),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let final_url = response.url().to_string();

        let bytes = response.bytes().await?;
        let decoded = decode_body(&bytes, content_type.as_deref())?;
        debug!(
            url = %final_url,
            bytes = bytes.len(),
            charset = decoded.encoding.name(),
            "Decoded response body"
        );

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            charset: decoded.encoding.name().to_string(),
            charset_source: decoded.source,
            content_length: bytes.len(),
            body: decoded.text,
        })
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        Fetcher::fetch_page(self, url).await
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        Fetcher::fetch(self, url).await
    }
}

fn is_http_url(url: &str) -> bool {
    let has_prefix = |prefix: &str| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// Validate and parse a request target, dropping any fragment.
pub fn parse_target(url: &str) -> Result<Url, FetchError> {
    if !is_http_url(url) {
        return Err(FetchError::InvalidInput(url.to_string()));
    }

    let mut parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed.set_fragment(None);
    Ok(parsed)
}
