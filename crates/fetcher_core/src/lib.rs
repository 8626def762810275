//! Fetcher core: pure submission state machine and view-model helpers.
mod classify;
mod effect;
mod error;
mod msg;
mod normalize;
mod progress;
mod request;
mod state;
mod update;
mod view_model;

pub use classify::{
    classify, MediaPayload, RawResponse, ResponseOutcome, DEFAULT_MEDIA_TYPE,
    GENERIC_FAILURE_MESSAGE, INVALID_RESPONSE_MESSAGE, NO_RESPONSE_MESSAGE,
};
pub use effect::Effect;
pub use error::ValidationError;
pub use msg::Msg;
pub use normalize::{normalize, NormalizedUrl, PRIMARY_DOMAIN};
pub use progress::TransferProgress;
pub use request::{
    build, CredentialFile, CredentialPolicy, RequestEncoding, SubmissionRequest, SubmitConfig,
    CREDENTIAL_FIELD, URL_FIELD,
};
pub use state::{AppState, AttemptId, UiState};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, SUCCESS_NOTICE};
