//! CEP lookup subsystem.
//!
//! # Data Flow
//! ```text
//! postal code
//!     → race.rs (RaceCoordinator: spawn providers, race against deadline)
//!     → first outcome
//!     → address.rs (normalize by provider)
//!     → AddressRecord | LookupError
//! ```
//!
//! # Design Decisions
//! - At most one record per lookup; losers are aborted on every exit path
//! - Timeouts stay distinct from internal failures so the gateway can map them separately

pub mod address;
pub mod error;
pub mod race;

pub use address::{AddressRecord, BrasilApiAddress, ViaCepAddress};
pub use error::{FailureKind, LookupError};
pub use race::{BuildError, RaceCoordinator, RaceOutcome, RaceSettings};
