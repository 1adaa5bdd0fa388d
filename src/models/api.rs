use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ConversationState, DesignRequirements, Message, SmartReply};
use crate::validation::clamp_unit;

// ============================================================================
// Structured turn
// ============================================================================

/// One structured model turn. Every field is required; a payload missing any
/// of them fails the turn as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BradStructuredResponse {
    pub response: String,
    pub smart_replies: Vec<SmartReply>,
    pub conversation_state: ConversationState,
    pub design_requirements: DesignRequirements,
    pub suggested_actions: Vec<String>,
    /// 0-1 scale.
    pub confidence_score: f64,
    pub should_transition_to_build: bool,
}

impl BradStructuredResponse {
    /// Pull every model-supplied score back into `[0, 1]`.
    pub fn clamped(mut self) -> Self {
        self.confidence_score = clamp_unit(self.confidence_score);
        for reply in &mut self.smart_replies {
            reply.relevance_score = clamp_unit(reply.relevance_score);
        }
        self
    }
}

// ============================================================================
// Turn endpoint
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatApiRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_requirements: Option<DesignRequirements>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChatApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BradStructuredResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatApiResponse {
    pub fn ok(data: BradStructuredResponse) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

// ============================================================================
// Generation endpoint
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHtmlRequest {
    pub design_requirements: DesignRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHtmlResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateHtmlResponse {
    pub fn ok(html: String) -> Self {
        Self {
            success: true,
            html: Some(html),
            error: None,
        }
    }
}
