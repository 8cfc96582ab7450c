//! Lookup failure taxonomy.

use std::time::Duration;
use thiserror::Error;

use crate::providers::{ProviderError, ProviderKind};

/// Coarse failure classes the gateway maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    BadInput,
    Timeout,
    Internal,
}

impl FailureKind {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::BadInput => "bad_input",
            FailureKind::Timeout => "timeout",
            FailureKind::Internal => "internal",
        }
    }
}

/// Errors that end a lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing or blank postal code.
    #[error("missing postal code")]
    BadInput,

    /// The provider call itself failed.
    #[error("{provider} request failed: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    /// The provider answered with a zero-length body.
    #[error("{provider} returned an empty body")]
    EmptyBody { provider: ProviderKind },

    /// The body did not match the provider's schema.
    #[error("{provider} returned an unexpected payload: {source}")]
    Parse {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },

    /// No usable outcome before the race deadline.
    #[error("no provider answered within {0:?}")]
    Timeout(Duration),

    /// Every provider task ended without delivering an outcome.
    #[error("no provider produced a result")]
    NoResult,
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::BadInput => FailureKind::BadInput,
            LookupError::Timeout(_) => FailureKind::Timeout,
            LookupError::Provider { .. }
            | LookupError::EmptyBody { .. }
            | LookupError::Parse { .. }
            | LookupError::NoResult => FailureKind::Internal,
        }
    }

    /// Provider blamed for this failure, if any.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            LookupError::Provider { provider, .. }
            | LookupError::EmptyBody { provider }
            | LookupError::Parse { provider, .. } => Some(*provider),
            LookupError::BadInput | LookupError::Timeout(_) | LookupError::NoResult => None,
        }
    }
}
