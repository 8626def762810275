use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use fetcher_core::{update, AppState, AppViewModel, CredentialFile, Effect, Msg, UiState};
use fetcher_engine::{ensure_output_dir, EngineHandle};

use super::config::Settings;
use super::effects::EffectRunner;
use super::render::{render, TerminalCommand};

const EVENT_POLL: Duration = Duration::from_millis(75);

/// Totals over every submitted link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub fn run_app(settings: Settings, urls: Vec<String>) -> Result<RunSummary> {
    let credential = settings
        .cookies
        .as_deref()
        .map(read_credential)
        .transpose()?;
    ensure_output_dir(&settings.output_dir)
        .with_context(|| format!("preparing output dir {}", settings.output_dir.display()))?;

    let engine = EngineHandle::new(settings.transport.clone(), settings.output_dir.clone())
        .context("starting download engine")?;
    engine_info!(
        "endpoint={} encoding={:?} credential={:?} output_dir={:?}",
        settings.transport.endpoint,
        settings.submit.encoding,
        settings.submit.credential,
        settings.output_dir
    );

    let mut controller = Controller::new(AppState::with_config(settings.submit), io::stderr());
    let runner = EffectRunner::new(engine);
    let mut summary = RunSummary::default();

    step(&mut controller, &runner, Msg::CredentialSelected(credential));
    for url in urls {
        step(&mut controller, &runner, Msg::UrlChanged(url));
        step(&mut controller, &runner, Msg::SubmitClicked);

        while controller.is_busy() {
            let msg = runner.next_msg(EVENT_POLL).unwrap_or(Msg::Tick);
            step(&mut controller, &runner, msg);
        }

        match controller.view().last_settled {
            Some(UiState::Succeeded) => summary.succeeded += 1,
            // Validation failures never reach a settled state but are failures all the same.
            _ => summary.failed += 1,
        }
    }

    Ok(summary)
}

/// Dispatch `msg` and run its effects, feeding back any the engine refused.
fn step<W: Write>(controller: &mut Controller<W>, runner: &EffectRunner, msg: Msg) {
    let mut pending = vec![msg];
    while let Some(msg) = pending.pop() {
        pending.extend(runner.enqueue(controller.dispatch(msg)));
    }
}

fn read_credential(path: &Path) -> Result<CredentialFile> {
    let contents =
        fs::read(path).with_context(|| format!("reading cookies file {}", path.display()))?;
    if contents.is_empty() {
        engine_warn!("cookies file {} is empty", path.display());
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cookies.txt".to_string());
    Ok(CredentialFile::new(file_name, contents))
}

/// Owns the state for the lifetime of one run and renders every change.
struct Controller<W: Write> {
    state: AppState,
    rendered: AppViewModel,
    out: W,
}

impl<W: Write> Controller<W> {
    fn new(state: AppState, out: W) -> Self {
        let rendered = state.view();
        Self {
            state,
            rendered,
            out,
        }
    }

    fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            let view = self.state.view();
            let commands = render(&self.rendered, &view);
            self.write(&commands);
            self.rendered = view;
        }
        effects
    }

    fn write(&mut self, commands: &[TerminalCommand]) {
        for command in commands {
            let result = match command {
                TerminalCommand::Status(text) => write!(self.out, "\r\x1b[2K{text}"),
                TerminalCommand::ClearStatus => write!(self.out, "\r\x1b[2K"),
                TerminalCommand::Notice(text) => writeln!(self.out, "{text}"),
                TerminalCommand::Error(text) => writeln!(self.out, "Error: {text}"),
            };
            if result.and_then(|_| self.out.flush()).is_err() {
                // Terminal is gone; keep processing so the attempt still settles.
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fetcher_core::{CredentialFile, MediaPayload, Msg, ResponseOutcome, UiState};

    use super::*;

    fn controller() -> Controller<Vec<u8>> {
        Controller::new(AppState::new(), Vec::new())
    }

    fn output(controller: &Controller<Vec<u8>>) -> String {
        String::from_utf8_lossy(&controller.out).into_owned()
    }

    #[test]
    fn invalid_url_prints_error_without_effects() {
        let mut controller = controller();
        controller.dispatch(Msg::UrlChanged("not a url".to_string()));
        let effects = controller.dispatch(Msg::SubmitClicked);

        assert!(effects.is_empty());
        assert!(!controller.is_busy());
        assert!(output(&controller).contains("Error: Please enter a valid YouTube URL"));
    }

    #[test]
    fn every_rejected_link_prints_its_own_error() {
        let mut controller = controller();
        for url in ["not a url", "https://vimeo.com/123"] {
            controller.dispatch(Msg::UrlChanged(url.to_string()));
            controller.dispatch(Msg::SubmitClicked);
        }

        let out = output(&controller);
        assert_eq!(
            out.matches("Error: Please enter a valid YouTube URL").count(),
            2,
            "{out}"
        );
    }

    #[test]
    fn full_cycle_renders_progress_and_notice() {
        let mut controller = controller();
        controller.dispatch(Msg::CredentialSelected(Some(CredentialFile::new(
            "cookies.txt",
            b"c".to_vec(),
        ))));
        controller.dispatch(Msg::UrlChanged("https://youtu.be/abc123".to_string()));
        let effects = controller.dispatch(Msg::SubmitClicked);
        assert_eq!(effects.len(), 1);
        assert!(controller.is_busy());

        controller.dispatch(Msg::TransferProgress {
            attempt: 1,
            loaded: 5,
            total: Some(10),
        });
        let effects = controller.dispatch(Msg::TransferFinished {
            attempt: 1,
            outcome: ResponseOutcome::BinaryPayload(MediaPayload {
                bytes: vec![0; 10],
                content_type: "video/mp4".to_string(),
            }),
        });
        assert!(matches!(effects.as_slice(), [Effect::SavePayload { .. }]));
        controller.dispatch(Msg::SaveFinished {
            attempt: 1,
            result: Ok("video.mp4".to_string()),
        });

        assert!(!controller.is_busy());
        assert_eq!(controller.view().last_settled, Some(UiState::Succeeded));
        let out = output(&controller);
        assert!(out.contains("Downloading (50%)"));
        assert!(out.contains("Download completed successfully! Saved to video.mp4"));
    }

    #[test]
    fn credential_is_read_with_its_file_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("my-cookies.txt");
        fs::write(&path, "# Netscape HTTP Cookie File\n").unwrap();

        let credential = read_credential(&path).unwrap();
        assert_eq!(credential.file_name, "my-cookies.txt");
        assert_eq!(credential.contents, b"# Netscape HTTP Cookie File\n");

        assert!(read_credential(&temp.path().join("missing.txt")).is_err());
    }
}
