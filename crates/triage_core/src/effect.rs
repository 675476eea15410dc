use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the selected report to the upload endpoint.
    Upload { generation: u64, file_name: String },
    /// Begin fixed-cadence status polling for a submitted job.
    StartPolling {
        generation: u64,
        analysis_id: String,
    },
    /// Stop any active polling. Idempotent; safe after natural termination.
    StopPolling,
    /// Hand the finished session to the host for the history list.
    Archive { entry: ArchiveEntry },
}

/// Final results of a completed analysis, keyed by worker display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub results: BTreeMap<String, String>,
}
