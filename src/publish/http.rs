use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};

use super::{OutboundEvent, PROP_SCHEMA, PROP_TRIP_ID, Publisher};
use crate::fetch::HttpClient;

const HEADER_KEY: HeaderName = HeaderName::from_static("x-message-key");
const HEADER_EVENT_TIME: HeaderName = HeaderName::from_static("x-event-time");
const HEADER_PROP_PREFIX: &str = "x-property-";

/// [`Publisher`] that POSTs each event to a message-bus HTTP produce
/// endpoint.
///
/// The payload goes in the body as `application/octet-stream`; routing key
/// and event time go in `x-message-key` / `x-event-time`, and message
/// properties in `x-property-*` headers.
pub struct HttpPublisher<C> {
    client: C,
    url: String,
}

impl<C> HttpPublisher<C> {
    pub fn new(client: C, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl<C: HttpClient> Publisher for HttpPublisher<C> {
    async fn publish(&self, event: &OutboundEvent) -> Result<()> {
        let mut req = reqwest::Request::new(Method::POST, self.url.parse()?);

        let headers = req.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(
            HEADER_KEY,
            HeaderValue::from_str(&event.key).context("routing key is not a valid header value")?,
        );
        headers.insert(
            HEADER_EVENT_TIME,
            HeaderValue::from_str(&event.event_time.to_string())?,
        );
        headers.insert(
            HeaderName::from_bytes(format!("{HEADER_PROP_PREFIX}{PROP_TRIP_ID}").as_bytes())?,
            HeaderValue::from_str(&event.key)?,
        );
        headers.insert(
            HeaderName::from_bytes(format!("{HEADER_PROP_PREFIX}{PROP_SCHEMA}").as_bytes())?,
            HeaderValue::from_static(event.schema),
        );

        *req.body_mut() = Some(event.payload.clone().into());

        let resp = self.client.execute(req).await?;
        if !resp.status().is_success() {
            bail!("produce endpoint rejected event with status {}", resp.status());
        }
        Ok(())
    }
}
