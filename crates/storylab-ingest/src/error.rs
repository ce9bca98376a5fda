//! Error taxonomy for log ingestion.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Which record grammar a line was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Experiment,
    Instance,
    Sample,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Experiment => write!(f, "Experiment"),
            Self::Instance => write!(f, "Instance"),
            Self::Sample => write!(f, "Sample"),
        }
    }
}

/// Errors raised while reassembling the record tree.
///
/// There is no recovery path: every variant aborts the enclosing load and
/// propagates to the caller.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A line does not match the grammar of the record it should describe.
    #[error("line {line:?} cannot be parsed as {kind}")]
    Parse { kind: RecordKind, line: String },

    /// Commencing and concluding markers describe different experiments.
    #[error("inconsistent commencing and concluding line: ({commencing}) vs ({concluding})")]
    MarkerMismatch {
        commencing: String,
        concluding: String,
    },

    /// A detail document's path list disagrees with the sizes declared on the
    /// sample line it belongs to.
    #[error("inconsistent size description for reasons: {found} paths, {declared} declared")]
    ReasonCount { found: usize, declared: usize },

    /// A story capture that survived the marker grammar but is not a UUID.
    #[error("invalid story identifier: {0}")]
    Story(#[from] uuid::Error),

    /// A numeric capture or target element failed integer conversion.
    #[error("invalid integer field: {0}")]
    Int(#[from] std::num::ParseIntError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
