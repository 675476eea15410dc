use std::collections::BTreeMap;
use std::sync::Once;

use pretty_assertions::assert_eq;
use triage_core::{
    update, AgentKey, AgentPhase, AgentUpdate, Block, Effect, JobStatus, Msg, SessionPhase,
    SessionState, StatusSnapshot, UploadReceipt,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(triage_logging::initialize_for_tests);
}

fn submit(state: SessionState, name: &str) -> (SessionState, u64) {
    let (state, _) = update(
        state,
        Msg::FileSelected {
            name: name.to_string(),
        },
    );
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    let generation = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Upload { generation, .. } => Some(*generation),
            _ => None,
        })
        .expect("upload effect");
    (state, generation)
}

fn start_polling(state: SessionState, generation: u64, analysis_id: &str) -> SessionState {
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            generation,
            result: Ok(UploadReceipt {
                analysis_id: analysis_id.to_string(),
                filename: None,
            }),
        },
    );
    state
}

fn snapshot(status: JobStatus) -> StatusSnapshot {
    StatusSnapshot {
        status,
        agents: BTreeMap::new(),
        results: BTreeMap::new(),
        error: None,
    }
}

fn agent_update(phase: AgentPhase, percent: u8) -> AgentUpdate {
    AgentUpdate { phase, percent }
}

#[test]
fn full_lifecycle_completes_once_and_archives_once() {
    init_logging();
    let state = SessionState::new();
    assert_eq!(state.view().phase, SessionPhase::Idle);

    let (state, generation) = submit(state, "report.txt");
    assert_eq!(state.view().phase, SessionPhase::Submitting);

    let state = start_polling(state, generation, "42");
    assert_eq!(state.view().phase, SessionPhase::Polling);

    // Two in-flight polls, then the terminal one.
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: snapshot(JobStatus::Processing),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: snapshot(JobStatus::Processing),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SessionPhase::Polling);

    let mut terminal = snapshot(JobStatus::Completed);
    terminal.results.insert(
        "FinalDiagnosis".to_string(),
        "All clear.".to_string(),
    );
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: terminal,
        },
    );
    assert_eq!(state.view().phase, SessionPhase::Completed);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::StopPolling);
    match &effects[1] {
        Effect::Archive { entry } => {
            assert_eq!(entry.file_name, "report.txt");
            assert_eq!(
                entry.results.get("FinalDiagnosis").map(String::as_str),
                Some("All clear.")
            );
        }
        other => panic!("expected archive effect, got {other:?}"),
    }

    // A duplicate terminal snapshot after completion is ignored: the host is
    // signalled exactly once.
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: snapshot(JobStatus::Completed),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SessionPhase::Completed);
}

#[test]
fn poll_transport_failure_keeps_the_session_polling() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let (state, effects) = update(
        state,
        Msg::StatusFailed {
            generation,
            message: "connection reset".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, SessionPhase::Polling);

    // The next successful tick still applies.
    let mut next = snapshot(JobStatus::Processing);
    next.agents.insert(
        "cardiologist".to_string(),
        agent_update(AgentPhase::Processing, 25),
    );
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: next,
        },
    );
    let view = state.view();
    let row = view
        .agents
        .iter()
        .find(|row| row.key == AgentKey::Cardiologist)
        .unwrap();
    assert_eq!(row.phase, AgentPhase::Processing);
    assert_eq!(row.percent, 25);
}

#[test]
fn worker_phase_never_regresses_from_completed() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let mut first = snapshot(JobStatus::Processing);
    first.agents.insert(
        "pulmonologist".to_string(),
        agent_update(AgentPhase::Completed, 100),
    );
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: first,
        },
    );

    // A delayed snapshot claiming the worker is still processing must not
    // move the phase backwards; the percentage renders as reported.
    let mut stale = snapshot(JobStatus::Processing);
    stale.agents.insert(
        "pulmonologist".to_string(),
        agent_update(AgentPhase::Processing, 50),
    );
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: stale,
        },
    );

    let view = state.view();
    let row = view
        .agents
        .iter()
        .find(|row| row.key == AgentKey::Pulmonologist)
        .unwrap();
    assert_eq!(row.phase, AgentPhase::Completed);
    assert_eq!(row.percent, 50);
}

#[test]
fn partial_snapshots_leave_missing_workers_untouched() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let mut first = snapshot(JobStatus::Processing);
    first.agents.insert(
        "cardiologist".to_string(),
        agent_update(AgentPhase::Processing, 40),
    );
    first
        .agents
        .insert("radiologist".to_string(), agent_update(AgentPhase::Completed, 100));
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: first,
        },
    );

    let view = state.view();
    for row in &view.agents {
        match row.key {
            AgentKey::Cardiologist => assert_eq!(row.phase, AgentPhase::Processing),
            // Unknown snapshot keys are dropped; workers the snapshot never
            // mentioned are still waiting.
            _ => assert_eq!(row.phase, AgentPhase::Waiting),
        }
    }
}

#[test]
fn completed_worker_report_is_rendered_once_available() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let mut progress = snapshot(JobStatus::Processing);
    progress.agents.insert(
        "cardiologist".to_string(),
        agent_update(AgentPhase::Completed, 100),
    );
    progress.results.insert(
        "Cardiologist".to_string(),
        "Section: Findings\nNormal sinus rhythm.".to_string(),
    );
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: progress,
        },
    );

    let view = state.view();
    let row = view
        .agents
        .iter()
        .find(|row| row.key == AgentKey::Cardiologist)
        .unwrap();
    let report = row.report.as_ref().expect("rendered report");
    assert_eq!(
        report.blocks[0],
        Block::Heading {
            level: 3,
            text: "Findings".to_string()
        }
    );
}

#[test]
fn upload_failure_fails_the_session_but_allows_resubmission() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            generation,
            result: Err("Network error: connection refused".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(
        view.error.as_deref(),
        Some("Network error: connection refused")
    );

    // The session is reusable for a fresh submission.
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert_eq!(
        effects,
        vec![Effect::Upload {
            generation: generation + 1,
            file_name: "report.txt".to_string(),
        }]
    );
    assert_eq!(state.view().phase, SessionPhase::Submitting);
}

#[test]
fn service_error_snapshot_fails_the_session() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let mut failed = snapshot(JobStatus::Error);
    failed.error = Some("Failed to process file".to_string());
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: failed,
        },
    );
    assert_eq!(effects, vec![Effect::StopPolling]);
    let view = state.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(view.error.as_deref(), Some("Failed to process file"));
}

#[test]
fn service_error_without_message_uses_the_generic_fallback() {
    init_logging();
    let (state, generation) = submit(SessionState::new(), "report.txt");
    let state = start_polling(state, generation, "42");

    let (state, _) = update(
        state,
        Msg::StatusArrived {
            generation,
            snapshot: snapshot(JobStatus::Error),
        },
    );
    assert_eq!(state.view().error.as_deref(), Some("Analysis failed"));
}
