//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check provider base URLs are usable absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;
use crate::providers::ProviderKind;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("race.timeout_ms must be greater than zero")]
    ZeroRaceTimeout,

    #[error("timeouts.request_secs ({request_ms} ms) must exceed race.timeout_ms ({race_ms} ms)")]
    RequestTimeoutTooShort { request_ms: u64, race_ms: u64 },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("providers.{} base_url '{url}' is invalid: {reason}", .provider.config_key())]
    InvalidBaseUrl {
        provider: ProviderKind,
        url: String,
        reason: String,
    },

    #[error("at least one provider must be enabled")]
    NoProviders,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.race.timeout_ms == 0 {
        errors.push(ValidationError::ZeroRaceTimeout);
    }

    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    if request_ms <= config.race.timeout_ms {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_ms,
            race_ms: config.race.timeout_ms,
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let mut enabled = 0;
    for (kind, provider) in config.providers.entries() {
        if !provider.enabled {
            continue;
        }
        enabled += 1;

        let raw = provider.base_url_for(kind);
        if let Err(reason) = check_base_url(raw) {
            errors.push(ValidationError::InvalidBaseUrl {
                provider: kind,
                url: raw.to_string(),
                reason,
            });
        }
    }
    if enabled == 0 {
        errors.push(ValidationError::NoProviders);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(())
}
