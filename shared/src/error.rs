use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    #[error("Network error: {0}")]
    NetworkFailure(String),
    #[error("Server error: {status} - {detail}")]
    ServerRejected { status: u16, detail: String },
    #[error("Failed to parse response: {0}")]
    DecodeFailure(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl DetectionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DetectionError::NetworkFailure(_) => FailureKind::NetworkFailure,
            DetectionError::ServerRejected { .. } => FailureKind::ServerRejected,
            DetectionError::DecodeFailure(_) => FailureKind::DecodeFailure,
            DetectionError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    /// The message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            DetectionError::NetworkFailure(detail)
            | DetectionError::ServerRejected { detail, .. }
            | DetectionError::DecodeFailure(detail)
            | DetectionError::MalformedResponse(detail) => detail,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DetectionError::MalformedResponse(reason.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum FailureKind {
    NetworkFailure,
    ServerRejected,
    DecodeFailure,
    MalformedResponse,
}

/// Payload of the `Failed` state: what went wrong, in a form the results
/// page can show directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<DetectionError> for Failure {
    fn from(err: DetectionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
