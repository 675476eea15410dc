use crate::document::RenderedDocument;
use crate::state::SessionPhase;
use crate::tracker::{AgentKey, AgentPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionViewModel {
    pub phase: SessionPhase,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub agents: Vec<AgentRowView>,
    pub dirty: bool,
}

/// Read-only row for one worker: phase, percentage, and the rendered report
/// once the worker has completed and its text has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRowView {
    pub key: AgentKey,
    pub display_name: &'static str,
    pub phase: AgentPhase,
    pub percent: u8,
    pub report: Option<RenderedDocument>,
}
