//! Response mapping.
//!
//! # Design Decisions
//! - Success is the provider's record as JSON, tagged with the winning provider
//! - Failures carry a status only, never a body
//! - BadInput → 400, Timeout → 408, Internal → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::lookup::{AddressRecord, FailureKind, LookupError};

/// Response header naming the provider whose record is returned.
pub const X_CEP_PROVIDER: &str = "x-cep-provider";

pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::BadInput => StatusCode::BAD_REQUEST,
        FailureKind::Timeout => StatusCode::REQUEST_TIMEOUT,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        status_for(self.kind()).into_response()
    }
}

impl IntoResponse for AddressRecord {
    fn into_response(self) -> Response {
        let provider = self.provider().name();
        ([(X_CEP_PROVIDER, provider)], Json(self)).into_response()
    }
}
