use std::collections::BTreeMap;

use crate::document::RenderedDocument;
use crate::job::AgentUpdate;
use crate::render::render;

/// The fixed set of analysis workers. `Final` is the cross-worker synthesis
/// step; the service sequences it after the specialists, the client models it
/// like any other worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgentKey {
    Cardiologist,
    Psychologist,
    Pulmonologist,
    Final,
}

impl AgentKey {
    pub const ALL: [AgentKey; 4] = [
        AgentKey::Cardiologist,
        AgentKey::Psychologist,
        AgentKey::Pulmonologist,
        AgentKey::Final,
    ];

    /// Key used by the status endpoint's `agent_progress` map.
    pub fn wire_key(self) -> &'static str {
        match self {
            AgentKey::Cardiologist => "cardiologist",
            AgentKey::Psychologist => "psychologist",
            AgentKey::Pulmonologist => "pulmonologist",
            AgentKey::Final => "final",
        }
    }

    /// Key used by the status endpoint's `results` map.
    pub fn result_key(self) -> &'static str {
        match self {
            AgentKey::Cardiologist => "Cardiologist",
            AgentKey::Psychologist => "Psychologist",
            AgentKey::Pulmonologist => "Pulmonologist",
            AgentKey::Final => "FinalDiagnosis",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgentKey::Cardiologist => "Cardiologist",
            AgentKey::Psychologist => "Psychologist",
            AgentKey::Pulmonologist => "Pulmonologist",
            AgentKey::Final => "Final Diagnosis",
        }
    }

    pub fn from_wire(key: &str) -> Option<AgentKey> {
        AgentKey::ALL
            .into_iter()
            .find(|agent| agent.wire_key() == key)
    }
}

/// Per-worker display phase. Ordered so progress is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AgentPhase {
    #[default]
    Waiting,
    Processing,
    Completed,
}

/// Raw report text plus its rendered form, cached once on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReport {
    pub raw: String,
    pub rendered: RenderedDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentSlot {
    pub phase: AgentPhase,
    pub percent: u8,
    pub report: Option<AgentReport>,
}

/// Progress state for the fixed worker set.
///
/// Snapshots are partial: unknown keys are ignored and missing keys leave
/// prior state untouched. A worker's phase never regresses once advanced;
/// the percentage renders whatever the latest snapshot reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTracker {
    slots: BTreeMap<AgentKey, AgentSlot>,
}

impl Default for AgentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentTracker {
    pub fn new() -> Self {
        Self {
            slots: AgentKey::ALL
                .into_iter()
                .map(|key| (key, AgentSlot::default()))
                .collect(),
        }
    }

    pub fn slot(&self, key: AgentKey) -> &AgentSlot {
        &self.slots[&key]
    }

    pub(crate) fn apply(&mut self, updates: &BTreeMap<String, AgentUpdate>) {
        for (wire_key, update) in updates {
            let Some(key) = AgentKey::from_wire(wire_key) else {
                continue;
            };
            let slot = self.slots.get_mut(&key).expect("fixed worker set");
            slot.phase = slot.phase.max(update.phase);
            slot.percent = update.percent.min(100);
        }
    }

    /// Cache the rendered report for a worker. The text is rendered once;
    /// later snapshots repeating the same result key do not re-render.
    pub(crate) fn attach_report(&mut self, key: AgentKey, raw: &str) {
        let slot = self.slots.get_mut(&key).expect("fixed worker set");
        if slot.report.is_none() {
            slot.report = Some(AgentReport {
                raw: raw.to_string(),
                rendered: render(raw),
            });
        }
    }
}
