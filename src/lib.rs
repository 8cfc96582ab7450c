//! CEP resolver library.
//!
//! Resolves Brazilian postal codes by racing BrasilAPI and ViaCep and returning
//! whichever answers first.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lookup;
pub mod observability;
pub mod providers;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use lookup::{AddressRecord, LookupError, RaceCoordinator};
