//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the lookup handler
//! - Wire up middleware (tracing, request ID, request timeout)
//! - Extract the postal code and hand it to the RaceCoordinator
//! - Swap in a new coordinator when the configuration is reloaded
//! - Serve until shutdown is signalled

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::form_urlencoded;

use crate::config::ServiceConfig;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::lookup::{BuildError, RaceCoordinator};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ArcSwap<RaceCoordinator>>,
}

/// HTTP server for the CEP resolver.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    coordinator: Arc<ArcSwap<RaceCoordinator>>,
}

impl HttpServer {
    /// Create a new HTTP server racing the providers described by `config`.
    pub fn new(config: ServiceConfig) -> Result<Self, BuildError> {
        let coordinator = RaceCoordinator::from_config(&config)?;
        Ok(Self::with_coordinator(config, coordinator))
    }

    /// Create a server around an already-built coordinator.
    pub fn with_coordinator(config: ServiceConfig, coordinator: RaceCoordinator) -> Self {
        let coordinator = Arc::new(ArcSwap::from_pointee(coordinator));
        let state = AppState {
            coordinator: coordinator.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            coordinator,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(lookup_handler))
            .fallback(not_found)
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config the server was started with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the coordinator for
    /// subsequent requests; in-flight races finish on the coordinator they started with.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            providers = ?self.coordinator.load().providers(),
            race_timeout_ms = self.config.race.timeout_ms,
            "HTTP server starting"
        );

        let coordinator = self.coordinator.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match RaceCoordinator::from_config(&new_config) {
                    Ok(next) => {
                        tracing::info!(
                            providers = ?next.providers(),
                            race_timeout_ms = new_config.race.timeout_ms,
                            policy = ?new_config.race.policy,
                            "Coordinator reloaded"
                        );
                        coordinator.store(Arc::new(next));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded config, keeping current coordinator");
                    }
                }
            }
        });

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        reloader.abort();
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// First `cep` value of a query string. Repeated keys are not an error.
fn postal_code(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "cep")
        .map(|(_, value)| value.into_owned())
}

/// `GET /?cep=<postal code>`
///
/// A missing or blank code is rejected by the coordinator before any provider is called.
async fn lookup_handler(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let cep = query.as_deref().and_then(postal_code).unwrap_or_default();

    let coordinator = state.coordinator.load_full();
    match coordinator.resolve(&cep).await {
        Ok(record) => {
            tracing::debug!(cep = %record.cep(), city = %record.city(), "Lookup resolved");
            record.into_response()
        }
        Err(e) => {
            tracing::debug!(cep = %cep, kind = e.kind().as_str(), "Lookup failed");
            e.into_response()
        }
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
