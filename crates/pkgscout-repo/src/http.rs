//! Network feeds
//!
//! A network feed serves `index.yaml` at its root over HTTP(S). Resolving the
//! feed fetches and parses that document; archives are fetched on demand from
//! each package's download URL, resolved against the feed root.

use async_trait::async_trait;
use pkgscout_core::Package;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::error::{RepoError, Result};
use crate::index::{FeedIndex, INDEX_FILE};
use crate::request::Request;
use crate::resource::{ArchiveSource, FeedResources};

/// HTTP client bound to one feed root
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pkgscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepoError::from_reqwest(e, timeout))?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a possibly relative URL against the feed root
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        self.base.join(url).map_err(|e| RepoError::InvalidArgument {
            message: format!("Invalid download URL '{}': {}", url, e),
        })
    }

    /// GET a URL; `Ok(None)` on 404
    pub async fn get_bytes(&self, url: &Url) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RepoError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
                message: format!("GET {} failed", url),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RepoError::from_reqwest(e, self.timeout))?;
        Ok(Some(bytes.to_vec()))
    }

    /// Fetch and parse the feed index
    pub async fn fetch_index(&self) -> Result<FeedIndex> {
        let index_url = self.resolve_url(INDEX_FILE)?;
        let data = self
            .get_bytes(&index_url)
            .await?
            .ok_or_else(|| RepoError::IndexNotFound {
                location: index_url.to_string(),
            })?;
        FeedIndex::from_bytes(&data)
    }
}

/// Archives fetched over HTTP
#[derive(Debug, Clone)]
pub struct HttpArchives {
    client: FeedClient,
}

impl HttpArchives {
    pub fn new(client: FeedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArchiveSource for HttpArchives {
    async fn fetch(&self, package: &Package, url: &str, request: &dyn Request) -> Result<Vec<u8>> {
        let full_url = self.client.resolve_url(url)?;
        request.debug(&format!("HttpArchives: GET {}", full_url));

        self.client
            .get_bytes(&full_url)
            .await?
            .ok_or_else(|| RepoError::ArchiveNotFound {
                id: package.id.clone(),
                version: package.version.to_string(),
                source_location: self.client.base().to_string(),
            })
    }
}

/// Discover the feed at a validated HTTP(S) location
pub async fn resolve(location: &Url, request: &dyn Request) -> Result<FeedResources<HttpArchives>> {
    let client = FeedClient::new(location.clone(), request.http_timeout())?;

    request.debug(&format!("HttpFeed: fetching index from {}", location));
    let index = client.fetch_index().await?;
    tracing::debug!(
        "Loaded feed {} with {} package id(s)",
        location,
        index.entries.len()
    );

    Ok(FeedResources::new(
        location.as_str(),
        index,
        HttpArchives::new(client),
    ))
}
