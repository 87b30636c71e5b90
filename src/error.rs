//! Failure taxonomy for the conversion pipeline.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure talking to the price oracle.
    #[error("price oracle unreachable: {0}")]
    OracleUnreachable(#[source] reqwest::Error),

    /// The oracle answered, but the answer is unusable (bad status, bad JSON,
    /// missing or non-positive quote).
    #[error("price oracle returned an unusable response: {0}")]
    OracleBadResponse(String),

    /// The inbound payload cannot be parsed as expected.
    #[error("malformed payload: {0}")]
    PayloadMalformed(String),

    /// A configuration update failed validation.
    #[error("{0}")]
    ConfigInvalid(String),

    /// The external configuration store could not be read or written.
    #[error("configuration store failure: {0}")]
    ConfigStoreFailure(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::ConfigInvalid(_) | Error::PayloadMalformed(_) => StatusCode::BAD_REQUEST,
            Error::OracleUnreachable(_)
            | Error::OracleBadResponse(_)
            | Error::ConfigStoreFailure(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}
