use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Who authored a transcript entry. `brad` is accepted on input for older shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "brad")]
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// A single entry in the conversation transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_memory_reference: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_build_update: Option<bool>,
    /// RFC 3339 creation time.
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }

    pub fn is_build_update(&self) -> bool {
        self.is_build_update.unwrap_or(false)
    }

    pub fn is_memory_reference(&self) -> bool {
        self.is_memory_reference.unwrap_or(false)
    }
}
