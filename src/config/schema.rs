//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the resolver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::ProviderKind;

/// Root configuration for the CEP resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Race settings shared by every lookup.
    pub race: RaceConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound HTTP client settings.
    pub http_client: HttpClientConfig,

    /// Upstream provider definitions.
    pub providers: ProvidersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How the race reacts when the first provider to answer did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// The first outcome decides the lookup, even when it is a failure.
    #[default]
    FailFast,
    /// Failures are skipped while another provider is still in flight.
    FirstSuccess,
}

/// Race configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Deadline for the whole race, covering every provider jointly.
    pub timeout_ms: u64,

    /// Outcome selection policy.
    pub policy: RacePolicy,
}

impl RaceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            policy: RacePolicy::FailFast,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 500,
            request_secs: 5,
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// User-Agent sent to providers.
    pub user_agent: String,

    /// Honor HTTP(S)_PROXY style environment variables.
    pub system_proxy: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("cep-resolver/", env!("CARGO_PKG_VERSION")).to_string(),
            system_proxy: true,
        }
    }
}

/// Settings for the two upstream providers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub brasil_api: ProviderConfig,
    pub via_cep: ProviderConfig,
}

impl ProvidersConfig {
    /// Provider settings paired with the provider they describe.
    pub fn entries(&self) -> [(ProviderKind, &ProviderConfig); 2] {
        [
            (ProviderKind::BrasilApi, &self.brasil_api),
            (ProviderKind::ViaCep, &self.via_cep),
        ]
    }
}

/// A single upstream provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Include this provider in every race.
    pub enabled: bool,

    /// Override for the provider's public host (scheme + authority, optional path).
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Base URL to call, falling back to the provider's public host.
    pub fn base_url_for(&self, kind: ProviderKind) -> &str {
        self.base_url.as_deref().unwrap_or(kind.default_base_url())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
