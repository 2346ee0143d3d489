//! Error Types Module
//!
//! A single error enum for everything the calculation core can reject. Degenerate
//! geometry (coincident or antipodal endpoints) is not an error; see
//! [`crate::geo::AmbiguousGeometry`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed input: out-of-range latitude, non-finite longitude, zero segment
    /// count, invalid instant or tuning parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The solar ephemeris rejected the query (e.g. ΔT unavailable for the year).
    #[error("ephemeris failure: {0}")]
    Ephemeris(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
