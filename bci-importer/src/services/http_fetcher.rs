//! HTTP network fetcher

use async_trait::async_trait;
use std::time::Duration;

use crate::store::{FetchResponse, NetworkFetcher, TransportError};

const USER_AGENT: &str = concat!("bci-importer/", env!("CARGO_PKG_VERSION"));

/// [`NetworkFetcher`] backed by a shared `reqwest` client
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError> {
        tracing::debug!(url = %url, timeout_secs = timeout.as_secs(), "GET");

        let response = self
            .http_client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
