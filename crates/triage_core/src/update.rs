use crate::state::SnapshotOutcome;
use crate::{ArchiveEntry, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { name } => {
            state.select_file(name);
            Vec::new()
        }
        Msg::AnalyzeClicked => match state.begin_submission() {
            Some((generation, file_name)) => vec![Effect::Upload {
                generation,
                file_name,
            }],
            // No valid file, or a submission is already in flight; a second
            // submit is rejected, not queued.
            None => Vec::new(),
        },
        Msg::UploadFinished { generation, result } => {
            if !state.expects_upload(generation) {
                return (state, Vec::new());
            }
            match result {
                Ok(receipt) => {
                    let analysis_id = receipt.analysis_id.clone();
                    state.accept_upload(receipt);
                    vec![Effect::StartPolling {
                        generation,
                        analysis_id,
                    }]
                }
                Err(message) => {
                    state.fail(message);
                    Vec::new()
                }
            }
        }
        Msg::StatusArrived {
            generation,
            snapshot,
        } => {
            if !state.expects_poll(generation) {
                return (state, Vec::new());
            }
            match state.apply_snapshot(snapshot) {
                SnapshotOutcome::Continue => Vec::new(),
                SnapshotOutcome::Completed(results) => {
                    let file_name = state.submitted_file();
                    state.complete();
                    vec![
                        Effect::StopPolling,
                        Effect::Archive {
                            entry: ArchiveEntry { file_name, results },
                        },
                    ]
                }
                SnapshotOutcome::Failed(message) => {
                    state.fail(message);
                    vec![Effect::StopPolling]
                }
            }
        }
        // Transient: the poll timer is the only retry mechanism, so a failed
        // tick changes nothing here.
        Msg::StatusFailed { .. } => Vec::new(),
        Msg::CancelClicked => {
            if state.cancel() {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
