#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTransfer {
        attempt: crate::AttemptId,
        request: crate::SubmissionRequest,
    },
    SavePayload {
        attempt: crate::AttemptId,
        payload: crate::MediaPayload,
    },
}
