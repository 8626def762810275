use crate::view_model::{AppViewModel, ProgressView};
use crate::{CredentialFile, SubmitConfig, TransferProgress, ValidationError};

pub type AttemptId = u64;

/// Visible lifecycle of the submit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Submitting,
    /// Payload received and being saved; settles to `Idle` once the save finishes.
    Succeeded,
    /// Only ever recorded as the last settled outcome; the live state returns to `Idle`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    config: SubmitConfig,
    url_input: String,
    credential: Option<CredentialFile>,
    ui: UiState,
    last_settled: Option<UiState>,
    error: Option<String>,
    /// Bumped for every error raised, so a repeated message still counts as new.
    error_serial: u64,
    saved_path: Option<String>,
    progress: TransferProgress,
    attempt: AttemptId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SubmitConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let progress = match self.ui {
            UiState::Submitting => match self.progress.percent() {
                Some(percent) => ProgressView::Percent(percent),
                None => ProgressView::Indeterminate {
                    loaded: self.progress.loaded,
                },
            },
            _ => ProgressView::Hidden,
        };
        AppViewModel {
            ui: self.ui.clone(),
            last_settled: self.last_settled.clone(),
            progress,
            submit_enabled: self.can_submit(),
            error: self.error.clone(),
            error_serial: self.error_serial,
            saved_path: self.saved_path.clone(),
            attempt: self.attempt,
            dirty: self.dirty,
        }
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn progress(&self) -> TransferProgress {
        self.progress
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn credential(&self) -> Option<&CredentialFile> {
        self.credential.as_ref()
    }

    /// Only `Idle` accepts a submit; this is the single-transfer guard.
    pub fn can_submit(&self) -> bool {
        self.ui == UiState::Idle
    }

    pub fn is_busy(&self) -> bool {
        !self.can_submit()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current_attempt(&self, attempt: AttemptId) -> bool {
        self.attempt == attempt
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        if self.url_input != text {
            self.url_input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn set_credential(&mut self, credential: Option<CredentialFile>) {
        self.credential = credential;
        self.dirty = true;
    }

    pub(crate) fn clear_messages(&mut self) {
        self.error = None;
        self.saved_path = None;
        self.last_settled = None;
        self.dirty = true;
    }

    pub(crate) fn reject(&mut self, err: ValidationError) {
        self.raise(err.to_string());
    }

    fn raise(&mut self, message: String) {
        self.error = Some(message);
        self.error_serial += 1;
        self.dirty = true;
    }

    pub(crate) fn begin_attempt(&mut self) -> AttemptId {
        self.attempt += 1;
        self.progress.reset();
        self.ui = UiState::Submitting;
        self.dirty = true;
        self.attempt
    }

    pub(crate) fn apply_progress(&mut self, attempt: AttemptId, loaded: u64, total: Option<u64>) {
        if self.ui != UiState::Submitting || !self.is_current_attempt(attempt) {
            return;
        }
        if self.progress.advance(loaded, total) {
            self.dirty = true;
        }
    }

    pub(crate) fn mark_succeeded(&mut self) {
        self.progress.reset();
        self.ui = UiState::Succeeded;
        self.dirty = true;
    }

    pub(crate) fn record_saved_path(&mut self, path: String) {
        self.saved_path = Some(path);
    }

    /// End the attempt: reset progress, keep the outcome for display and return to `Idle`.
    pub(crate) fn settle(&mut self, terminal: UiState) {
        self.progress.reset();
        if let UiState::Failed(message) = &terminal {
            self.raise(message.clone());
        }
        self.last_settled = Some(terminal);
        self.ui = UiState::Idle;
        self.dirty = true;
    }
}
