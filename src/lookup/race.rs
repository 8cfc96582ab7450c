//! Race coordination across providers.
//!
//! # States
//! ```text
//! Racing → Succeeded: first outcome is a non-empty body that normalizes
//! Racing → Failed:    first outcome is a failure (fail_fast)
//!                     or every provider failed (first_success)
//! Racing → TimedOut:  deadline fires before a usable outcome
//! ```
//!
//! # Design Decisions
//! - One deadline per race, shared by every provider
//! - Provider tasks deliver into a channel buffered to the number of providers,
//!   so a late finisher never blocks and never outlives the race unnoticed
//! - The race owns its `JoinSet`; leaving `resolve` on any path aborts the losers

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use url::Url;

use crate::config::{RaceConfig, RacePolicy, ServiceConfig};
use crate::lookup::address::AddressRecord;
use crate::lookup::error::LookupError;
use crate::observability::metrics;
use crate::providers::http::build_client;
use crate::providers::{CepProvider, HttpProvider, ProviderError, ProviderKind};

/// Settings for a single race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSettings {
    pub timeout: Duration,
    pub policy: RacePolicy,
}

impl From<&RaceConfig> for RaceSettings {
    fn from(config: &RaceConfig) -> Self {
        Self {
            timeout: config.timeout(),
            policy: config.policy,
        }
    }
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self::from(&RaceConfig::default())
    }
}

/// What the race produced next.
#[derive(Debug)]
pub enum RaceOutcome {
    Success { provider: ProviderKind, body: Bytes },
    Failed { provider: ProviderKind, cause: ProviderError },
    TimedOut,
}

type Delivery = (ProviderKind, Result<Bytes, ProviderError>);

/// One in-flight race. Dropping it aborts every provider task still running.
struct Race {
    tasks: JoinSet<()>,
    outcomes: mpsc::Receiver<Delivery>,
    deadline: Instant,
}

impl Race {
    fn start(providers: &[Arc<dyn CepProvider>], cep: &str, timeout: Duration) -> Self {
        let (tx, outcomes) = mpsc::channel(providers.len().max(1));
        let mut tasks = JoinSet::new();

        for provider in providers {
            let provider = Arc::clone(provider);
            let tx = tx.clone();
            let cep = cep.to_owned();
            tasks.spawn(async move {
                let kind = provider.kind();
                let result = provider.fetch(&cep).await;
                // Fails only once the race is over; the outcome is discarded.
                let _ = tx.try_send((kind, result));
            });
        }

        Self {
            tasks,
            outcomes,
            deadline: Instant::now() + timeout,
        }
    }

    /// Wait for the next outcome or the deadline, whichever comes first.
    ///
    /// Returns `None` once every provider task has ended and all outcomes were taken.
    async fn next(&mut self) -> Option<RaceOutcome> {
        tokio::select! {
            biased;
            delivered = self.outcomes.recv() => delivered.map(|(provider, result)| match result {
                Ok(body) => RaceOutcome::Success { provider, body },
                Err(cause) => RaceOutcome::Failed { provider, cause },
            }),
            _ = sleep_until(self.deadline) => Some(RaceOutcome::TimedOut),
        }
    }
}

impl Drop for Race {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

/// Errors building a coordinator from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid base URL for {provider}: {source}")]
    BaseUrl {
        provider: ProviderKind,
        #[source]
        source: url::ParseError,
    },
}

/// Races every configured provider for each lookup.
#[derive(Debug)]
pub struct RaceCoordinator {
    providers: Vec<Arc<dyn CepProvider>>,
    settings: RaceSettings,
}

impl RaceCoordinator {
    pub fn new(providers: Vec<Arc<dyn CepProvider>>, settings: RaceSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }

    /// Build HTTP providers for every enabled provider in `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, BuildError> {
        let client = build_client(&config.http_client, &config.timeouts)?;

        let mut providers: Vec<Arc<dyn CepProvider>> = Vec::new();
        for (kind, provider) in config.providers.entries() {
            if !provider.enabled {
                continue;
            }
            let base_url = Url::parse(provider.base_url_for(kind))
                .map_err(|source| BuildError::BaseUrl {
                    provider: kind,
                    source,
                })?;
            providers.push(Arc::new(HttpProvider::new(kind, base_url, client.clone())));
        }

        Ok(Self::new(providers, RaceSettings::from(&config.race)))
    }

    pub fn settings(&self) -> RaceSettings {
        self.settings
    }

    /// Providers taking part in every race.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Resolve `cep` to an address by racing every provider.
    pub async fn resolve(&self, cep: &str) -> Result<AddressRecord, LookupError> {
        let start = std::time::Instant::now();
        let cep = cep.trim();
        let result = if cep.is_empty() {
            tracing::warn!("Lookup without postal code");
            Err(LookupError::BadInput)
        } else {
            self.run_race(cep).await
        };
        metrics::record_lookup(&result, start);
        result
    }

    async fn run_race(&self, cep: &str) -> Result<AddressRecord, LookupError> {
        let mut race = Race::start(&self.providers, cep, self.settings.timeout);
        let mut last_error = None;

        while let Some(outcome) = race.next().await {
            let settled = match outcome {
                RaceOutcome::TimedOut => {
                    tracing::warn!(
                        cep = %cep,
                        timeout_ms = self.settings.timeout.as_millis() as u64,
                        "Providers took too long"
                    );
                    return Err(LookupError::Timeout(self.settings.timeout));
                }
                RaceOutcome::Failed { provider, cause } => Err(LookupError::Provider {
                    provider,
                    source: cause,
                }),
                RaceOutcome::Success { provider, body } => settle(provider, &body),
            };

            match settled {
                Ok(record) => {
                    tracing::info!(cep = %cep, provider = %record.provider(), "Race won");
                    metrics::record_race_win(record.provider());
                    return Ok(record);
                }
                Err(error) if self.settings.policy == RacePolicy::FailFast => {
                    tracing::error!(
                        cep = %cep,
                        provider = ?error.provider(),
                        error = %error,
                        "First outcome unusable"
                    );
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!(
                        cep = %cep,
                        provider = ?error.provider(),
                        error = %error,
                        "Outcome unusable, waiting for remaining providers"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(LookupError::NoResult))
    }
}

fn settle(provider: ProviderKind, body: &[u8]) -> Result<AddressRecord, LookupError> {
    if body.is_empty() {
        return Err(LookupError::EmptyBody { provider });
    }
    AddressRecord::normalize(provider, body).map_err(|source| LookupError::Parse { provider, source })
}
