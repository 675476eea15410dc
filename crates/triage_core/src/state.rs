use std::collections::BTreeMap;

use crate::job::{JobStatus, StatusSnapshot, UploadReceipt};
use crate::tracker::{AgentKey, AgentPhase, AgentTracker};
use crate::view_model::{AgentRowView, SessionViewModel};

/// Extensions the upload endpoint accepts. Checked before any network call.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

const INVALID_FILE_MESSAGE: &str = "Please select a PDF or TXT file.";
const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

/// What one applied snapshot means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SnapshotOutcome {
    Continue,
    Completed(BTreeMap<String, String>),
    Failed(String),
}

/// State for one analysis session: the selected file, the in-flight job, and
/// per-worker progress. All mutation happens through [`crate::update`];
/// engine events carry the generation they were issued under so anything
/// from a cancelled or superseded submission is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    phase: SessionPhase,
    generation: u64,
    selected_file: Option<String>,
    analysis_id: Option<String>,
    tracker: AgentTracker,
    results: BTreeMap<String, String>,
    error: Option<String>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionViewModel {
        let agents = AgentKey::ALL
            .into_iter()
            .map(|key| {
                let slot = self.tracker.slot(key);
                AgentRowView {
                    key,
                    display_name: key.display_name(),
                    phase: slot.phase,
                    percent: slot.percent,
                    report: slot.report.as_ref().map(|report| report.rendered.clone()),
                }
            })
            .collect();
        SessionViewModel {
            phase: self.phase,
            file_name: self.selected_file.clone(),
            error: self.error.clone(),
            agents,
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and clears it; the host renders when true.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn in_flight(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitting | SessionPhase::Polling)
    }

    pub(crate) fn select_file(&mut self, name: String) {
        if self.in_flight() {
            return;
        }
        let allowed = name
            .rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                ALLOWED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if allowed {
            self.selected_file = Some(name);
            self.error = None;
        } else {
            self.selected_file = None;
            self.error = Some(INVALID_FILE_MESSAGE.to_string());
        }
        self.dirty = true;
    }

    /// Start a fresh submission if one is possible. Bumps the generation and
    /// resets all per-job state; terminal sessions are reusable.
    pub(crate) fn begin_submission(&mut self) -> Option<(u64, String)> {
        if self.in_flight() {
            return None;
        }
        let file_name = self.selected_file.clone()?;
        self.generation += 1;
        self.phase = SessionPhase::Submitting;
        self.analysis_id = None;
        self.tracker = AgentTracker::new();
        self.results.clear();
        self.error = None;
        self.dirty = true;
        Some((self.generation, file_name))
    }

    pub(crate) fn expects_upload(&self, generation: u64) -> bool {
        self.phase == SessionPhase::Submitting && self.generation == generation
    }

    pub(crate) fn expects_poll(&self, generation: u64) -> bool {
        self.phase == SessionPhase::Polling && self.generation == generation
    }

    pub(crate) fn accept_upload(&mut self, receipt: UploadReceipt) {
        self.analysis_id = Some(receipt.analysis_id);
        self.phase = SessionPhase::Polling;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = SessionPhase::Failed;
        self.error = Some(message);
        self.dirty = true;
    }

    /// Apply one full status snapshot: tracker updates, result texts, and
    /// rendered reports for workers that have completed. Last write wins;
    /// there is no ordering protection against delayed responses.
    pub(crate) fn apply_snapshot(&mut self, snapshot: StatusSnapshot) -> SnapshotOutcome {
        self.tracker.apply(&snapshot.agents);
        for (result_key, text) in snapshot.results {
            self.results.insert(result_key, text);
        }
        for key in AgentKey::ALL {
            if self.tracker.slot(key).phase == AgentPhase::Completed {
                if let Some(text) = self.results.get(key.result_key()) {
                    let text = text.clone();
                    self.tracker.attach_report(key, &text);
                }
            }
        }
        self.dirty = true;
        match snapshot.status {
            JobStatus::Completed => SnapshotOutcome::Completed(self.results.clone()),
            JobStatus::Error => SnapshotOutcome::Failed(
                snapshot
                    .error
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ),
            JobStatus::Pending | JobStatus::Processing => SnapshotOutcome::Continue,
        }
    }

    pub(crate) fn complete(&mut self) {
        self.phase = SessionPhase::Completed;
        self.dirty = true;
    }

    pub(crate) fn submitted_file(&self) -> String {
        self.selected_file.clone().unwrap_or_default()
    }

    /// Abandon the in-flight submission and return to a fresh idle state.
    /// The generation bump makes any late engine event a no-op. Keeps the
    /// selected file. Returns false when there was nothing to cancel.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.in_flight() {
            return false;
        }
        self.generation += 1;
        self.phase = SessionPhase::Idle;
        self.analysis_id = None;
        self.tracker = AgentTracker::new();
        self.results.clear();
        self.error = None;
        self.dirty = true;
        true
    }
}
