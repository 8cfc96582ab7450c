//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lookup, providers, http produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request via the trace span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
