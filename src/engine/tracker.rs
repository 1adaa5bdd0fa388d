//! Conversation state tracker: the single current snapshot of phase, intent,
//! and merged requirements for one conversation.

use serde::Serialize;
use ts_rs::TS;

use super::requirements::{completeness_score, merge_requirements, missing_fields};
use crate::models::{BradStructuredResponse, ConversationState, DesignRequirements, Phase};

/// Read-only view handed to the UI shell.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub state: ConversationState,
    pub requirements: DesignRequirements,
    pub completeness_score: f64,
    /// Canonical fields still unknown, in canonical order.
    pub missing_fields: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub confidence_score: f64,
    /// Number of structured turns applied so far.
    pub version: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationTracker {
    state: ConversationState,
    requirements: DesignRequirements,
    completeness: f64,
    suggested_actions: Vec<String>,
    confidence: f64,
    version: u64,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn requirements(&self) -> &DesignRequirements {
        &self.requirements
    }

    pub fn completeness(&self) -> f64 {
        self.completeness
    }

    /// Apply one validated structured turn. State is replaced wholesale,
    /// requirements are merged, completeness is recomputed locally. The phase
    /// is stored as classified upstream; no ordering is enforced here.
    pub fn apply_turn(&mut self, turn: &BradStructuredResponse) {
        let merged = merge_requirements(&self.requirements, &turn.design_requirements);
        let completeness = completeness_score(&merged);

        if turn.conversation_state.phase != self.state.phase {
            tracing::debug!(
                from = ?self.state.phase,
                to = ?turn.conversation_state.phase,
                "Conversation phase changed"
            );
        }

        self.state = turn.conversation_state.clone();
        self.requirements = merged;
        self.completeness = completeness;
        self.suggested_actions = turn.suggested_actions.clone();
        self.confidence = turn.confidence_score;
        self.version += 1;
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.state.clone(),
            requirements: self.requirements.clone(),
            completeness_score: self.completeness,
            missing_fields: missing_fields(&self.requirements)
                .into_iter()
                .map(String::from)
                .collect(),
            suggested_actions: self.suggested_actions.clone(),
            confidence_score: self.confidence,
            version: self.version,
        }
    }
}
