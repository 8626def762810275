use crate::{
    build, normalize, AppState, AttemptId, Effect, Msg, ResponseOutcome, SubmissionRequest,
    UiState, ValidationError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::CredentialSelected(credential) => {
            state.set_credential(credential);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::TransferProgress {
            attempt,
            loaded,
            total,
        } => {
            state.apply_progress(attempt, loaded, total);
            Vec::new()
        }
        Msg::TransferFinished { attempt, outcome } => finish_transfer(&mut state, attempt, outcome),
        Msg::SaveFinished { attempt, result } => {
            finish_save(&mut state, attempt, result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    // A transfer is already outstanding; the button is disabled, so drop the click.
    if !state.can_submit() {
        return Vec::new();
    }
    state.clear_messages();

    match prepare_request(state) {
        Ok(request) => {
            let attempt = state.begin_attempt();
            vec![Effect::StartTransfer { attempt, request }]
        }
        Err(err) => {
            state.reject(err);
            Vec::new()
        }
    }
}

fn prepare_request(state: &AppState) -> Result<SubmissionRequest, ValidationError> {
    let url = normalize(state.url_input())?;
    build(url, state.credential().cloned(), state.config())
}

fn finish_transfer(
    state: &mut AppState,
    attempt: AttemptId,
    outcome: ResponseOutcome,
) -> Vec<Effect> {
    if *state.ui() != UiState::Submitting || !state.is_current_attempt(attempt) {
        return Vec::new();
    }
    match outcome {
        ResponseOutcome::BinaryPayload(payload) => {
            state.mark_succeeded();
            vec![Effect::SavePayload { attempt, payload }]
        }
        ResponseOutcome::StructuredError(message) | ResponseOutcome::TransportFailure(message) => {
            state.settle(UiState::Failed(message));
            Vec::new()
        }
    }
}

fn finish_save(state: &mut AppState, attempt: AttemptId, result: Result<String, String>) {
    if *state.ui() != UiState::Succeeded || !state.is_current_attempt(attempt) {
        return;
    }
    match result {
        Ok(path) => {
            state.record_saved_path(path);
            state.settle(UiState::Succeeded);
        }
        Err(message) => state.settle(UiState::Failed(message)),
    }
}
