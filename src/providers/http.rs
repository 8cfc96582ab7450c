//! HTTP-backed provider adapter.
//!
//! # Responsibilities
//! - Build the provider-specific lookup URL
//! - Issue exactly one GET and read the full body
//! - Surface construction, transport and body-read failures as `ProviderError`

use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::{HttpClientConfig, TimeoutConfig};
use crate::observability::metrics;
use crate::providers::{CepProvider, ProviderError, ProviderKind};

/// Build the shared outbound client used by every provider.
pub fn build_client(
    http: &HttpClientConfig,
    timeouts: &TimeoutConfig,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(http.user_agent.clone())
        .connect_timeout(Duration::from_millis(timeouts.connect_ms));
    if !http.system_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}

/// A provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    kind: ProviderKind,
    base_url: Url,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(kind: ProviderKind, base_url: Url, client: reqwest::Client) -> Self {
        Self {
            kind,
            base_url,
            client,
        }
    }
}

#[async_trait]
impl CepProvider for HttpProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch(&self, cep: &str) -> Result<Bytes, ProviderError> {
        let start = Instant::now();
        let result = self.call(cep).await;
        metrics::record_provider_call(self.kind, result.is_ok(), start);
        result
    }
}

impl HttpProvider {
    async fn call(&self, cep: &str) -> Result<Bytes, ProviderError> {
        let url = self.kind.endpoint(&self.base_url, cep)?;
        tracing::debug!(provider = %self.kind, url = %url, "Calling provider");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        // No status check: an error page is still a body the normalizer can reject.
        let status = response.status();
        let body = response.bytes().await.map_err(ProviderError::Body)?;

        tracing::debug!(
            provider = %self.kind,
            status = %status,
            bytes = body.len(),
            "Provider responded"
        );
        Ok(body)
    }
}
