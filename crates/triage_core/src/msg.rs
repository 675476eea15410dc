use crate::{StatusSnapshot, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a report file (name only; the host reads the bytes).
    FileSelected { name: String },
    /// User asked for the selected report to be analyzed.
    AnalyzeClicked,
    /// User abandoned the in-flight submission.
    CancelClicked,
    /// Engine finished the upload request.
    UploadFinished {
        generation: u64,
        result: Result<UploadReceipt, String>,
    },
    /// Engine delivered one status poll.
    StatusArrived {
        generation: u64,
        snapshot: StatusSnapshot,
    },
    /// One status poll failed in transit; the next tick retries.
    StatusFailed { generation: u64, message: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
