//! Triage core: pure session state machine, worker tracker, and report
//! renderer.
mod document;
mod effect;
mod job;
mod msg;
mod render;
mod state;
mod tracker;
mod update;
mod view_model;

pub use document::{Block, Inline, RenderedDocument};
pub use effect::{ArchiveEntry, Effect};
pub use job::{AgentUpdate, JobStatus, StatusSnapshot, UploadReceipt};
pub use msg::Msg;
pub use render::render;
pub use state::{SessionPhase, SessionState, ALLOWED_EXTENSIONS};
pub use tracker::{AgentKey, AgentPhase, AgentReport, AgentSlot, AgentTracker};
pub use update::update;
pub use view_model::{AgentRowView, SessionViewModel};
