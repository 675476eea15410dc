use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use triage_logging::{triage_debug, triage_info, triage_warn};

use crate::client::AnalysisApi;
use crate::{EngineEvent, Generation};

enum EngineCommand {
    Upload {
        generation: Generation,
        file_name: String,
        bytes: Vec<u8>,
    },
    StartPolling {
        generation: Generation,
        analysis_id: String,
    },
    StopPolling,
}

/// Command side of the engine. The engine runs a tokio runtime on its own
/// thread; the host talks to it over channels only.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Spawn the engine thread. Returns the handle plus the event receiver
    /// the host drains.
    pub fn new(
        api: Arc<dyn AnalysisApi>,
        poll_interval: Duration,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // Token for the currently active poll task, if any. Starting a
            // new poll or stopping cancels the previous one; cancelling an
            // already-finished task is a no-op.
            let mut poll_guard: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Upload {
                        generation,
                        file_name,
                        bytes,
                    } => {
                        triage_info!(
                            "upload gen={} file={} ({} bytes)",
                            generation,
                            file_name,
                            bytes.len()
                        );
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.upload(&file_name, bytes).await;
                            let _ = event_tx.send(EngineEvent::UploadCompleted { generation, result });
                        });
                    }
                    EngineCommand::StartPolling {
                        generation,
                        analysis_id,
                    } => {
                        if let Some(token) = poll_guard.take() {
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        poll_guard = Some(token.clone());
                        triage_info!("polling gen={} id={}", generation, analysis_id);
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(poll_status(
                            api,
                            event_tx,
                            token,
                            generation,
                            analysis_id,
                            poll_interval,
                        ));
                    }
                    EngineCommand::StopPolling => {
                        if let Some(token) = poll_guard.take() {
                            token.cancel();
                        }
                    }
                }
            }

            if let Some(token) = poll_guard.take() {
                token.cancel();
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn upload(&self, generation: Generation, file_name: impl Into<String>, bytes: Vec<u8>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            generation,
            file_name: file_name.into(),
            bytes,
        });
    }

    pub fn start_polling(&self, generation: Generation, analysis_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling {
            generation,
            analysis_id: analysis_id.into(),
        });
    }

    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling);
    }
}

/// Fixed-cadence status poll. Transport failures are reported and the loop
/// keeps ticking; the next tick is the retry. The task ends on cancellation
/// or after delivering a terminal snapshot. Cancellation cannot abort a
/// request already in flight; that response still arrives and the session
/// drops it by generation.
async fn poll_status(
    api: Arc<dyn AnalysisApi>,
    event_tx: mpsc::Sender<EngineEvent>,
    token: CancellationToken,
    generation: Generation,
    analysis_id: String,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick fires immediately; consume it so the first
    // status request lands one interval after polling starts.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                triage_debug!("polling cancelled gen={} id={}", generation, analysis_id);
                break;
            }
            _ = ticker.tick() => {
                match api.status(&analysis_id).await {
                    Ok(response) => {
                        let terminal = response.is_terminal();
                        if event_tx
                            .send(EngineEvent::StatusArrived { generation, response })
                            .is_err()
                        {
                            break;
                        }
                        if terminal {
                            triage_info!("polling done gen={} id={}", generation, analysis_id);
                            break;
                        }
                    }
                    Err(error) => {
                        triage_warn!(
                            "status poll failed gen={} id={}: {}",
                            generation,
                            analysis_id,
                            error
                        );
                        if event_tx
                            .send(EngineEvent::StatusFailed { generation, error })
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        }
    }
}
