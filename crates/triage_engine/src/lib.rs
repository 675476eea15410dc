//! Triage engine: remote service client and effect execution.
mod client;
mod engine;
mod types;

pub use client::{AnalysisApi, ClientSettings, ReqwestAnalysisApi};
pub use engine::EngineHandle;
pub use types::{
    AgentProgressEntry, ApiError, EngineEvent, Generation, StatusResponse, UploadReceipt,
    UploadResponse,
};
