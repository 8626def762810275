use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use fetcher_core::{
    classify, AttemptId, MediaPayload, ResponseOutcome, SubmissionRequest,
    GENERIC_FAILURE_MESSAGE,
};

use crate::save::DownloadTrigger;
use crate::transport::{ChannelProgressSink, ReqwestTransport, Transport, TransportSettings};
use crate::EngineEvent;

/// Reported when a save could not run to completion.
pub const SAVE_FAILURE_MESSAGE: &str = "Could not save the download.";

enum EngineCommand {
    Transfer {
        attempt: AttemptId,
        request: SubmissionRequest,
    },
    Save {
        attempt: AttemptId,
        payload: MediaPayload,
    },
}

impl EngineCommand {
    /// Terminal event sent in place of the one a crashed task never produced.
    fn abandoned(&self) -> EngineEvent {
        match self {
            EngineCommand::Transfer { attempt, .. } => EngineEvent::TransferCompleted {
                attempt: *attempt,
                outcome: ResponseOutcome::TransportFailure(GENERIC_FAILURE_MESSAGE.to_string()),
            },
            EngineCommand::Save { attempt, .. } => EngineEvent::SaveCompleted {
                attempt: *attempt,
                result: Err(SAVE_FAILURE_MESSAGE.to_string()),
            },
        }
    }
}

/// Runs transfers and saves on a background runtime; results come back as events.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings, output_dir: PathBuf) -> io::Result<Self> {
        Self::with_transport(Arc::new(ReqwestTransport::new(settings)), output_dir)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, output_dir: PathBuf) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let trigger = Arc::new(DownloadTrigger::new(output_dir));

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let transport = transport.clone();
                let trigger = trigger.clone();
                let event_tx = event_tx.clone();
                let abandoned = command.abandoned();
                runtime.spawn(async move {
                    let task = tokio::spawn(handle_command(
                        transport,
                        trigger,
                        command,
                        event_tx.clone(),
                    ));
                    if let Err(err) = task.await {
                        engine_error!("engine task failed: {}", err);
                        let _ = event_tx.send(abandoned);
                    }
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Queue a transfer. Returns `false` when the engine is no longer running.
    pub fn transfer(&self, attempt: AttemptId, request: SubmissionRequest) -> bool {
        self.cmd_tx
            .send(EngineCommand::Transfer { attempt, request })
            .is_ok()
    }

    /// Queue a save. Returns `false` when the engine is no longer running.
    pub fn save(&self, attempt: AttemptId, payload: MediaPayload) -> bool {
        self.cmd_tx
            .send(EngineCommand::Save { attempt, payload })
            .is_ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    transport: Arc<dyn Transport>,
    trigger: Arc<DownloadTrigger>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Transfer { attempt, request } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let outcome = match transport.send(attempt, &request, &sink).await {
                Ok(response) => classify(response),
                Err(err) => {
                    engine_warn!("attempt={} transport failure: {}", attempt, err);
                    ResponseOutcome::TransportFailure(err.user_message())
                }
            };
            if let ResponseOutcome::StructuredError(message) = &outcome {
                engine_warn!("attempt={} rejected by backend: {}", attempt, message);
            }
            let _ = event_tx.send(EngineEvent::TransferCompleted { attempt, outcome });
        }
        EngineCommand::Save { attempt, payload } => {
            let saved = tokio::task::spawn_blocking(move || trigger.trigger(&payload)).await;
            let result = match saved {
                Ok(Ok(path)) => {
                    engine_info!("attempt={} saved {:?}", attempt, path);
                    Ok(path)
                }
                Ok(Err(err)) => {
                    engine_error!("attempt={} save failed: {}", attempt, err);
                    Err(format!("Could not save the download: {err}"))
                }
                Err(err) => {
                    engine_error!("attempt={} save task failed: {}", attempt, err);
                    Err(SAVE_FAILURE_MESSAGE.to_string())
                }
            };
            let _ = event_tx.send(EngineEvent::SaveCompleted { attempt, result });
        }
    }
}
