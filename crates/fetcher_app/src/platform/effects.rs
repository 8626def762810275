use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use fetcher_core::{AttemptId, Effect, Msg, ResponseOutcome, GENERIC_FAILURE_MESSAGE};
use fetcher_engine::{EngineEvent, EngineHandle, SAVE_FAILURE_MESSAGE};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Hand effects to the engine. Effects the engine refused come back as the
    /// failure message that settles their attempt.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut refused = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartTransfer { attempt, request } => {
                    engine_info!(
                        "StartTransfer attempt={} url={}",
                        attempt,
                        request.source_url()
                    );
                    if !self.engine.transfer(attempt, request) {
                        engine_error!("engine stopped; attempt={} not started", attempt);
                        refused.push(transfer_refused(attempt));
                    }
                }
                Effect::SavePayload { attempt, payload } => {
                    engine_info!("SavePayload attempt={} payload={:?}", attempt, payload);
                    if !self.engine.save(attempt, payload) {
                        engine_error!("engine stopped; attempt={} not saved", attempt);
                        refused.push(save_refused(attempt));
                    }
                }
            }
        }
        refused
    }

    /// Wait up to `timeout` for the next engine event, translated into a message.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn transfer_refused(attempt: AttemptId) -> Msg {
    Msg::TransferFinished {
        attempt,
        outcome: ResponseOutcome::TransportFailure(GENERIC_FAILURE_MESSAGE.to_string()),
    }
}

fn save_refused(attempt: AttemptId) -> Msg {
    Msg::SaveFinished {
        attempt,
        result: Err(SAVE_FAILURE_MESSAGE.to_string()),
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { attempt, progress } => Msg::TransferProgress {
            attempt,
            loaded: progress.loaded,
            total: progress.total,
        },
        EngineEvent::TransferCompleted { attempt, outcome } => {
            engine_debug!(
                "TransferCompleted attempt={} success={}",
                attempt,
                outcome.is_success()
            );
            Msg::TransferFinished { attempt, outcome }
        }
        EngineEvent::SaveCompleted { attempt, result } => Msg::SaveFinished {
            attempt,
            result: result.map(|path| path.display().to_string()),
        },
    }
}
