//! Crate-wide error taxonomy.
//!
//! Every failure mode a caller can observe is a named variant here rather
//! than a bag of `anyhow::Error`s — the decision engine and truth provider
//! both rely on being able to match on *kind*, not on message text.

use thiserror::Error;

use crate::models::{MediaTruth, ProbeState};

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {recording_id}")]
    NotFound { recording_id: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Truth is not yet READY; caller should retry after the hint.
    #[error("preparing (retry after {retry_after_s}s)")]
    Preparing {
        state: ProbeState,
        retry_after_s: u64,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    /// A cached terminal `FAILED` state (§4.5 step 6, §7 "terminal metadata
    /// failures are sticky"). Carries the last-known media truth so callers
    /// can still render container/codecs alongside the failure reason.
    #[error("upstream error: {message}")]
    UpstreamTerminal {
        message: String,
        truth: Box<MediaTruth>,
    },

    /// The decision engine's unknown-truth gate fired (§4.6).
    #[error("decision ambiguous: {0}")]
    DecisionAmbiguous(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    #[must_use]
    pub fn not_found(recording_id: impl Into<String>) -> Self {
        Self::NotFound {
            recording_id: recording_id.into(),
        }
    }

    /// Maps this error to the HTTP status an (out-of-scope) transport layer
    /// should use, per §7's recovery column.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::Preparing { .. } => 503,
            Self::Unsupported(_) => 422,
            Self::Upstream(_) | Self::UpstreamTerminal { .. } => 502,
            Self::DecisionAmbiguous(_) => 422,
            Self::Internal(_) => 500,
        }
    }
}

impl From<crate::collaborators::ProbeError> for Error {
    fn from(err: crate::collaborators::ProbeError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<crate::collaborators::BuildError> for Error {
    fn from(err: crate::collaborators::BuildError) -> Self {
        Self::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
