use std::collections::BTreeMap;

use crate::tracker::AgentPhase;

/// Overall job state as reported by one status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// One worker's entry in a status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentUpdate {
    pub phase: AgentPhase,
    pub percent: u8,
}

/// Full status payload from one poll. Supersedes prior knowledge for every
/// key it contains; keys it omits keep their previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub agents: BTreeMap<String, AgentUpdate>,
    pub results: BTreeMap<String, String>,
    pub error: Option<String>,
}

/// Identifier handed back by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub analysis_id: String,
    pub filename: Option<String>,
}
