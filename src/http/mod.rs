//! HTTP gateway subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, tracing span)
//!     → lookup handler (extract `cep`, run the race)
//!     → response.rs (record as JSON, or status-only failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::X_CEP_PROVIDER;
pub use server::HttpServer;
