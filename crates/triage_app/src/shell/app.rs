use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use triage_core::{update, Effect, Msg, SessionPhase, SessionState};
use triage_engine::ClientSettings;
use triage_logging::triage_info;

use super::effects::EffectRunner;
use super::history::AnalysisHistory;
use super::ui;

/// How long the loop waits for an engine message before emitting a tick.
const IDLE_TICK: Duration = Duration::from_millis(200);

pub struct HostOptions {
    pub file: PathBuf,
    pub settings: ClientSettings,
}

/// Run one analysis session to its terminal state: read the report, submit
/// it, render progress as snapshots arrive, and archive the result.
pub fn run(options: HostOptions) -> anyhow::Result<()> {
    let file_name = options
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("file name is not valid UTF-8: {:?}", options.file))?;
    let bytes =
        fs::read(&options.file).with_context(|| format!("read {}", options.file.display()))?;
    triage_info!("submitting {} ({} bytes)", file_name, bytes.len());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&options.settings, bytes, msg_tx)?;
    let mut history = AnalysisHistory::new();

    let mut state = SessionState::new();
    state = dispatch(state, Msg::FileSelected { name: file_name }, &runner, &mut history);
    if let Some(error) = state.view().error {
        bail!("{error}");
    }
    state = dispatch(state, Msg::AnalyzeClicked, &runner, &mut history);

    loop {
        let msg = match msg_rx.recv_timeout(IDLE_TICK) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => Msg::Tick,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                bail!("engine stopped before the session finished")
            }
        };
        state = dispatch(state, msg, &runner, &mut history);

        match state.phase() {
            SessionPhase::Completed => {
                ui::print_final_reports(&state.view());
                ui::print_history(&history);
                return Ok(());
            }
            SessionPhase::Failed => {
                let message = state
                    .view()
                    .error
                    .unwrap_or_else(|| "Analysis failed".to_string());
                bail!("{message}");
            }
            _ => {}
        }
    }
}

fn dispatch(
    state: SessionState,
    msg: Msg,
    runner: &EffectRunner,
    history: &mut AnalysisHistory,
) -> SessionState {
    let (mut state, effects) = update(state, msg);
    for effect in effects {
        match effect {
            Effect::Archive { entry } => {
                let archived = history.record(entry);
                triage_info!("archived analysis of {}", archived.display_name);
            }
            other => runner.run(other),
        }
    }
    if state.consume_dirty() {
        ui::print_status(&state.view());
    }
    state
}
