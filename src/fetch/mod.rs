//! Feed snapshot retrieval.
//!
//! The pipeline only needs a byte buffer per poll; [`FeedSource`] is the
//! trait for producing one, and [`HttpFeedSource`] implements it over HTTP.
//! [`HttpClient`] abstracts the underlying HTTP transport so both the
//! inbound fetch and the outbound publish can be exercised with fakes.

mod basic;

pub use basic::BasicClient;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Request, Response};

/// The HTTP transport seam shared by the feed fetch and the publish gateway.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Produces one feed snapshot per call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Performs an HTTP GET against `url` and returns the response body.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// [`FeedSource`] that fetches the configured feed URL on every call.
pub struct HttpFeedSource<C> {
    client: C,
    url: String,
}

impl<C> HttpFeedSource<C> {
    pub fn new(client: C, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for HttpFeedSource<C> {
    async fn fetch(&self) -> Result<Vec<u8>> {
        fetch_bytes(&self.client, &self.url).await
    }
}
