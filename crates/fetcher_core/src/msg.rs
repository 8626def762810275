#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input.
    UrlChanged(String),
    /// User picked (or cleared) the cookie export file.
    CredentialSelected(Option<crate::CredentialFile>),
    /// User pressed the download button.
    SubmitClicked,
    /// Engine received more response bytes for an attempt.
    TransferProgress {
        attempt: crate::AttemptId,
        loaded: u64,
        total: Option<u64>,
    },
    /// Engine finished an attempt; the outcome is already classified.
    TransferFinished {
        attempt: crate::AttemptId,
        outcome: crate::ResponseOutcome,
    },
    /// Engine finished saving a payload: saved path, or a message on failure.
    SaveFinished {
        attempt: crate::AttemptId,
        result: Result<String, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
