use crate::{AttemptId, UiState};

pub const SUCCESS_NOTICE: &str = "Download completed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressView {
    #[default]
    Hidden,
    /// Total size unknown; render a spinner rather than a stalled percentage.
    Indeterminate { loaded: u64 },
    Percent(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub ui: UiState,
    pub last_settled: Option<UiState>,
    pub progress: ProgressView,
    pub submit_enabled: bool,
    pub error: Option<String>,
    /// Changes whenever a new error is raised, even one with the same text.
    pub error_serial: u64,
    pub saved_path: Option<String>,
    pub attempt: AttemptId,
    pub dirty: bool,
}

impl AppViewModel {
    /// Success text for the last attempt, if it succeeded.
    pub fn notice(&self) -> Option<String> {
        if self.last_settled != Some(UiState::Succeeded) {
            return None;
        }
        Some(match &self.saved_path {
            Some(path) => format!("{SUCCESS_NOTICE} Saved to {path}"),
            None => SUCCESS_NOTICE.to_string(),
        })
    }
}
