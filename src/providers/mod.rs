//! Upstream CEP providers.
//!
//! # Data Flow
//! ```text
//! RaceCoordinator
//!     → one task per CepProvider (fetch)
//!     → raw body tagged with ProviderKind
//!     → lookup::address (normalization by ProviderKind)
//! ```
//!
//! # Design Decisions
//! - Providers return the raw body regardless of HTTP status; the body is judged downstream
//! - Cancellation is dropping the in-flight `fetch` future
//! - Providers never retry

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

pub mod http;

pub use http::HttpProvider;

/// The closed set of upstream lookup services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ProviderKind {
    BrasilApi,
    ViaCep,
}

impl ProviderKind {
    /// Name used in logs, metrics and the `x-cep-provider` header.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::BrasilApi => "BrasilAPI",
            ProviderKind::ViaCep => "ViaCep",
        }
    }

    /// Key of this provider under `[providers]` in the config file.
    pub fn config_key(&self) -> &'static str {
        match self {
            ProviderKind::BrasilApi => "brasil_api",
            ProviderKind::ViaCep => "via_cep",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::BrasilApi => "https://brasilapi.com.br",
            ProviderKind::ViaCep => "http://viacep.com.br",
        }
    }

    /// Build the lookup URL for `cep` below `base`.
    ///
    /// The postal code is appended as a single percent-encoded path segment.
    pub fn endpoint(&self, base: &Url, cep: &str) -> Result<Url, ProviderError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProviderError::Request(format!("base URL '{}' cannot be a base", base))
            })?;
            segments.pop_if_empty();
            match self {
                ProviderKind::BrasilApi => {
                    segments.extend(["api", "cep", "v1", cep]);
                }
                ProviderKind::ViaCep => {
                    segments.extend(["ws", cep, "json", ""]);
                }
            }
        }
        Ok(url)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while calling a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The outbound request could not be built.
    #[error("invalid request: {0}")]
    Request(String),

    /// Connection, DNS or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// A single upstream lookup service.
#[async_trait]
pub trait CepProvider: Send + Sync + fmt::Debug {
    /// Which provider this is; selects the normalization schema.
    fn kind(&self) -> ProviderKind;

    /// Perform one lookup and return the raw response body.
    async fn fetch(&self, cep: &str) -> Result<Bytes, ProviderError>;
}
