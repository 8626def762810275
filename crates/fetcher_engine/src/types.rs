use std::fmt;
use std::path::PathBuf;

use fetcher_core::{AttemptId, ResponseOutcome, TransferProgress, NO_RESPONSE_MESSAGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        attempt: AttemptId,
        progress: TransferProgress,
    },
    TransferCompleted {
        attempt: AttemptId,
        outcome: ResponseOutcome,
    },
    SaveCompleted {
        attempt: AttemptId,
        result: Result<PathBuf, String>,
    },
}

/// The request never produced a usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Message safe to show to the user; internal details stay in the log.
    pub fn user_message(&self) -> String {
        match &self.kind {
            FailureKind::Timeout | FailureKind::Connect => NO_RESPONSE_MESSAGE.to_string(),
            FailureKind::Network => {
                "Connection lost while receiving the download. Please try again.".to_string()
            }
            FailureKind::TooLarge { max_bytes, .. } => format!(
                "Download exceeds the {} MiB size limit.",
                max_bytes / (1024 * 1024)
            ),
            FailureKind::InvalidEndpoint | FailureKind::InvalidRequest => {
                "Download service is misconfigured.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    InvalidRequest,
    Timeout,
    Connect,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connect => write!(f, "connection failed"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
