//! Error types for the birthcare data layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("facility id is required")]
    MissingFacility,

    #[error("patient id is required")]
    MissingPatient,
}
