//! Crate-wide error type.
//!
//! Library code returns [`Error`] everywhere; the CLI layer wraps it in
//! `anyhow` for user-facing context.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input rejected before any write: a bad batch item, an
    /// unparseable CSV/JSON payload, an invalid archive layout.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Underlying store failure. A mid-batch occurrence rolls the whole
    /// transaction back; no partial state stays visible.
    #[error("storage failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// External translation provider failure, surfaced verbatim. Never
    /// retried; already-stored translations are unaffected.
    #[error("translation provider: {0}")]
    Provider(String),

    /// The addressed key/group does not exist. Tolerated as a no-op inside
    /// batches, reported as a failure standalone.
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(format!("malformed JSON: {err}"))
    }
}
