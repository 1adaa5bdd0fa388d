//! Turn processor: one user submission through the turn endpoint and back
//! into the session.

use std::sync::atomic::{AtomicBool, Ordering};

use super::build::BuildOutcome;
use super::keywords::extract_keywords;
use super::prompt::CONTEXT_WINDOW;
use super::session::ConversationSession;
use crate::config::BuildReadinessPolicy;
use crate::error::AppError;
use crate::models::{BradStructuredResponse, ChatApiRequest, Message, Sender};
use crate::validation::require_non_empty;

pub const TURN_FALLBACK_MESSAGE: &str =
    "Sorry, I'm having trouble processing that right now. Could you try rephrasing? 🤔";

/// What one submission produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant message appended for this turn.
    pub reply: Message,
    /// False when the fallback message was appended instead of a model reply.
    pub succeeded: bool,
    pub quick_replies: Vec<String>,
    /// Set when this turn signalled readiness and the build ran.
    pub build: Option<BuildOutcome>,
}

/// Holds the composing flag for the lifetime of one turn.
struct ComposingGuard<'a>(&'a AtomicBool);

impl<'a> ComposingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ComposingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConversationSession {
    /// Submit user text. Rejected with `Validation` when blank and `Busy`
    /// while another turn is in flight; upstream failures become the fallback
    /// message rather than an error.
    #[tracing::instrument(skip_all, fields(session_id = %self.id()))]
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, AppError> {
        require_non_empty("message", text)?;
        let text = text.trim();

        let composing = ComposingGuard::acquire(&self.composing).ok_or_else(|| {
            AppError::Busy("A reply is still being composed for this conversation".into())
        })?;

        let request = {
            let mut state = self.state()?;
            let history: Vec<Message> = {
                let transcript = state.transcript();
                let start = transcript.len().saturating_sub(CONTEXT_WINDOW);
                transcript[start..].to_vec()
            };
            let user_message = self.new_message(text, Sender::User, false, false);
            state.push(user_message);
            state.show_quick_replies = false;
            state.smart_replies.clear();

            let requirements = state.tracker.requirements();
            ChatApiRequest {
                message: text.to_string(),
                conversation_history: history,
                current_requirements: (!requirements.is_empty()).then(|| requirements.clone()),
            }
        };

        let result = self.backend.send_turn(&request).await;

        let (reply, succeeded) = {
            let mut state = self.state()?;
            let (reply, succeeded) = match result {
                Ok(turn) => {
                    let turn = turn.clamped();
                    state.tracker.apply_turn(&turn);
                    state.smart_replies = turn.smart_replies.clone();
                    state.should_transition_to_build =
                        self.is_ready(&turn, state.tracker.completeness());

                    let keywords = extract_keywords(text);
                    let recalled = state.memory.remember(&keywords);

                    tracing::info!(
                        phase = ?turn.conversation_state.phase,
                        completeness = state.tracker.completeness(),
                        ready = state.should_transition_to_build,
                        "Turn applied"
                    );
                    (
                        self.new_message(&turn.response, Sender::Assistant, recalled, false),
                        true,
                    )
                }
                Err(e) => {
                    tracing::warn!(kind = e.kind(), "Turn failed, appending fallback: {}", e);
                    (
                        self.new_message(TURN_FALLBACK_MESSAGE, Sender::Assistant, false, false),
                        false,
                    )
                }
            };
            state.push(reply.clone());
            state.show_quick_replies = true;
            (reply, succeeded)
        };
        drop(composing);

        // A failed turn never starts a build, even if an earlier one left the flag set.
        let build = if succeeded {
            self.try_build().await?
        } else {
            None
        };
        let quick_replies = self.quick_replies()?;

        Ok(TurnOutcome {
            reply,
            succeeded,
            quick_replies,
            build,
        })
    }

    fn is_ready(&self, turn: &BradStructuredResponse, completeness: f64) -> bool {
        match self.readiness {
            BuildReadinessPolicy::ModelSignal => turn.should_transition_to_build,
            BuildReadinessPolicy::CompletenessThreshold(threshold) => completeness >= threshold,
        }
    }
}
