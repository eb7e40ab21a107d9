//! Access to the blob storage holding uploaded images.

use crate::config::BlobConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob storage token is not configured")]
    NotConfigured,

    #[error("blob storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("blob storage returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("invalid blob storage URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A file held in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub url: String,
    #[serde(default)]
    pub pathname: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Every blob currently stored, across all pages.
    async fn list(&self) -> Result<Vec<StoredBlob>, BlobError>;

    /// Deletes the given blob URLs in a single batch.
    async fn delete(&self, urls: &[String]) -> Result<(), BlobError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    blobs: Vec<StoredBlob>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    urls: &'a [String],
}

/// Client for the Vercel Blob REST API.
#[derive(Debug, Clone)]
pub struct VercelBlobStore {
    client: Client,
    api_url: Url,
    token: Option<String>,
    page_size: u32,
}

impl VercelBlobStore {
    pub fn new(config: &BlobConfig) -> Result<Self, BlobError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_url: ensure_slash(&config.api_url),
            token: config.token.clone().filter(|t| !t.is_empty()),
            page_size: config.list_page_size.max(1),
        })
    }

    fn token(&self) -> Result<&str, BlobError> {
        self.token.as_deref().ok_or(BlobError::NotConfigured)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BlobError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(%status, %body, "Blob storage request failed");
        Err(BlobError::Api { status, body })
    }
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<StoredBlob>, BlobError> {
        let token = self.token()?;
        let mut blobs = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = self.api_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("limit", &self.page_size.to_string());
                if let Some(cursor) = &cursor {
                    query.append_pair("cursor", cursor);
                }
            }

            let response = self.client.get(url).bearer_auth(token).send().await?;
            let page: ListPage = Self::check(response).await?.json().await?;
            debug!(count = page.blobs.len(), has_more = page.has_more, "Fetched blob page");
            blobs.extend(page.blobs);

            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blobs)
    }

    #[instrument(skip(self, urls), fields(count = urls.len()), err)]
    async fn delete(&self, urls: &[String]) -> Result<(), BlobError> {
        if urls.is_empty() {
            return Ok(());
        }
        let token = self.token()?;
        let url = self.api_url.join("delete")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&DeleteBody { urls })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Ensure a URL has a trailing slash so `join` appends rather than replaces the last segment.
fn ensure_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Blob store backed by process memory, used in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: std::sync::Mutex<Vec<String>>,
    fail_deletes: bool,
}

#[cfg(test)]
impl InMemoryBlobStore {
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blobs: std::sync::Mutex::new(urls.into_iter().map(Into::into).collect()),
            fail_deletes: false,
        }
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.blobs.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn list(&self) -> Result<Vec<StoredBlob>, BlobError> {
        Ok(self
            .urls()
            .into_iter()
            .map(|url| StoredBlob {
                url,
                pathname: None,
                size: None,
            })
            .collect())
    }

    async fn delete(&self, urls: &[String]) -> Result<(), BlobError> {
        if self.fail_deletes {
            return Err(BlobError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "delete rejected".to_string(),
            });
        }
        self.blobs.lock().unwrap().retain(|u| !urls.contains(u));
        Ok(())
    }
}
