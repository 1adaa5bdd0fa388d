use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Conversational phase as classified by the model on each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Discovery,
    Requirements,
    Confirmation,
    ReadyToBuild,
}

impl Phase {
    pub const ALL: [&'static str; 4] = ["discovery", "requirements", "confirmation", "ready-to-build"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversationState {
    pub phase: Phase,
    pub user_intent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum SmartReplyCategory {
    DirectAnswer,
    Elaboration,
    Alternative,
    Clarification,
}

impl SmartReplyCategory {
    pub const ALL: [&'static str; 4] = ["direct-answer", "elaboration", "alternative", "clarification"];
}

/// A model-suggested quick reply. Recomputed every turn, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SmartReply {
    pub text: String,
    pub category: SmartReplyCategory,
    /// 0-1, higher is more relevant.
    pub relevance_score: f64,
}
