use fetcher_core::{AppViewModel, ProgressView, UiState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Overwrite the transient status line.
    Status(String),
    /// Clear the transient status line.
    ClearStatus,
    Notice(String),
    Error(String),
}

/// Commands that bring the terminal from `prev` to `view`.
pub fn render(prev: &AppViewModel, view: &AppViewModel) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    let status = status_text(view);
    if status != status_text(prev) {
        cmds.push(match status {
            Some(text) => TerminalCommand::Status(text),
            None => TerminalCommand::ClearStatus,
        });
    }

    if view.error_serial != prev.error_serial {
        if let Some(error) = &view.error {
            cmds.push(TerminalCommand::Error(error.clone()));
        }
    }

    let notice = view.notice();
    if notice != prev.notice() {
        if let Some(notice) = notice {
            cmds.push(TerminalCommand::Notice(notice));
        }
    }

    cmds
}

fn status_text(view: &AppViewModel) -> Option<String> {
    match (&view.ui, view.progress) {
        (UiState::Submitting, ProgressView::Percent(percent)) => {
            Some(format!("Downloading ({percent}%)"))
        }
        (UiState::Submitting, ProgressView::Indeterminate { loaded }) if loaded > 0 => {
            Some(format!("Downloading... {}", format_bytes(loaded)))
        }
        (UiState::Submitting, _) => Some("Downloading...".to_string()),
        (UiState::Succeeded, _) => Some("Saving...".to_string()),
        _ => None,
    }
}

fn format_bytes(value: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{value} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
