use std::sync::{mpsc, Arc};
use std::thread;

use triage_core::{AgentPhase, AgentUpdate, Effect, JobStatus, Msg, StatusSnapshot, UploadReceipt};
use triage_engine::{
    ClientSettings, EngineEvent, EngineHandle, ReqwestAnalysisApi, StatusResponse,
};

/// Executes core effects against the engine and forwards engine events back
/// into the message loop as core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    file_bytes: Vec<u8>,
}

impl EffectRunner {
    pub fn new(
        settings: &ClientSettings,
        file_bytes: Vec<u8>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> anyhow::Result<Self> {
        let api = Arc::new(ReqwestAnalysisApi::new(settings)?);
        let (engine, event_rx) = EngineHandle::new(api, settings.poll_interval);
        spawn_event_loop(event_rx, msg_tx);
        Ok(Self { engine, file_bytes })
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::Upload {
                generation,
                file_name,
            } => {
                self.engine
                    .upload(generation, file_name, self.file_bytes.clone());
            }
            Effect::StartPolling {
                generation,
                analysis_id,
            } => self.engine.start_polling(generation, analysis_id),
            Effect::StopPolling => self.engine.stop_polling(),
            // Archival is the host's own concern; see the app loop.
            Effect::Archive { .. } => {}
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted { generation, result } => Msg::UploadFinished {
            generation,
            result: result
                .map(|receipt| UploadReceipt {
                    analysis_id: receipt.analysis_id,
                    filename: receipt.filename,
                })
                .map_err(|error| error.to_string()),
        },
        EngineEvent::StatusArrived {
            generation,
            response,
        } => Msg::StatusArrived {
            generation,
            snapshot: map_status(response),
        },
        EngineEvent::StatusFailed { generation, error } => Msg::StatusFailed {
            generation,
            message: error.to_string(),
        },
    }
}

fn map_status(response: StatusResponse) -> StatusSnapshot {
    let status = map_job_status(&response.status);
    let agents = response
        .agent_progress
        .into_iter()
        .map(|(key, entry)| {
            (
                key,
                AgentUpdate {
                    phase: map_agent_phase(&entry.status),
                    percent: entry.progress.min(100),
                },
            )
        })
        .collect();
    StatusSnapshot {
        status,
        agents,
        results: response.results,
        error: response.error,
    }
}

fn map_job_status(status: &str) -> JobStatus {
    match status {
        "pending" => JobStatus::Pending,
        "completed" => JobStatus::Completed,
        "error" => JobStatus::Error,
        // The service also reports intermediate labels such as "starting"
        // and "running_agents"; anything non-terminal keeps the poll going.
        _ => JobStatus::Processing,
    }
}

fn map_agent_phase(status: &str) -> AgentPhase {
    match status {
        "waiting" => AgentPhase::Waiting,
        "completed" => AgentPhase::Completed,
        _ => AgentPhase::Processing,
    }
}
