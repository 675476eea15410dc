use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Wire shape of the upload endpoint's reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Identifier and echo data for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub analysis_id: String,
    pub filename: Option<String>,
}

/// Wire shape of one status poll. A full snapshot, not a delta.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub agent_progress: BTreeMap<String, AgentProgressEntry>,
    #[serde(default)]
    pub results: BTreeMap<String, String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    /// The service stops progressing after these; polling stops with it.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "error")
    }
}

/// One worker's entry in `agent_progress`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentProgressEntry {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Service(String),
}

/// Identifies a submission across the command/event channels. Events from a
/// superseded generation are dropped by the session.
pub type Generation = u64;

/// Event stream from the engine back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadCompleted {
        generation: Generation,
        result: Result<UploadReceipt, ApiError>,
    },
    StatusArrived {
        generation: Generation,
        response: StatusResponse,
    },
    StatusFailed {
        generation: Generation,
        error: ApiError,
    },
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::UploadCompleted { generation, result } => match result {
                Ok(receipt) => {
                    write!(f, "upload ok gen={generation} id={}", receipt.analysis_id)
                }
                Err(error) => write!(f, "upload failed gen={generation}: {error}"),
            },
            EngineEvent::StatusArrived {
                generation,
                response,
            } => write!(f, "status gen={generation}: {}", response.status),
            EngineEvent::StatusFailed { generation, error } => {
                write!(f, "status poll failed gen={generation}: {error}")
            }
        }
    }
}
