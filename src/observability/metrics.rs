//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_lookups_total` (counter): lookups by outcome
//! - `cep_lookup_duration_seconds` (histogram): race latency by outcome
//! - `cep_provider_calls_total` (counter): completed provider calls by provider, result
//! - `cep_race_wins_total` (counter): races won by provider
//!
//! Without an installed recorder every call is a no-op, which is what tests rely on.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::lookup::{AddressRecord, LookupError};
use crate::providers::ProviderKind;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the end of a lookup.
pub fn record_lookup(result: &Result<AddressRecord, LookupError>, start: Instant) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind().as_str(),
    };
    counter!("cep_lookups_total", "outcome" => outcome).increment(1);
    histogram!("cep_lookup_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a provider call that ran to completion (cancelled calls are not counted).
pub fn record_provider_call(provider: ProviderKind, ok: bool, start: Instant) {
    let result = if ok { "ok" } else { "error" };
    counter!(
        "cep_provider_calls_total",
        "provider" => provider.name(),
        "result" => result
    )
    .increment(1);
    histogram!("cep_provider_duration_seconds", "provider" => provider.name())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_race_win(provider: ProviderKind) {
    counter!("cep_race_wins_total", "provider" => provider.name()).increment(1);
}
