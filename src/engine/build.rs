//! Build trigger: the one-shot page generation with a simulated progress
//! ticker running beside the real call.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use ts_rs::TS;

use super::parser::strip_code_fences;
use super::session::{BuildPhase, ConversationSession};
use crate::error::AppError;
use crate::models::Sender;

pub const BUILD_START_MESSAGE: &str =
    "Alright, let's get building! I'll whip up something awesome based on our conversation 🚀";
pub const BUILD_SUCCESS_MESSAGE: &str =
    "Boom! 💥 Check out what we've got cooking on the right. What do you think?";
pub const BUILD_FAILURE_MESSAGE: &str =
    "Ugh, something went sideways while I was building that 😅 Let's keep chatting and give it another shot in a moment.";

/// One tick of the simulated progress schedule.
#[derive(Debug, Clone)]
pub struct ProgressStep {
    pub percent: u8,
    /// Wait before this step is shown, measured from the previous one.
    pub delay: Duration,
    pub stage: &'static str,
}

/// Wall-clock schedule shown while the page is generated.
pub fn default_schedule() -> Vec<ProgressStep> {
    vec![
        ProgressStep {
            percent: 20,
            delay: Duration::from_millis(1000),
            stage: "Alright, firing up my design brain... *cracks knuckles* 🧠",
        },
        ProgressStep {
            percent: 40,
            delay: Duration::from_millis(2000),
            stage: "Setting up the foundation - I'm thinking clean structure with some spicy animations ✨",
        },
        ProgressStep {
            percent: 60,
            delay: Duration::from_millis(2500),
            stage: "Adding the visual magic... this color palette is *chef's kiss* 🎨",
        },
        ProgressStep {
            percent: 80,
            delay: Duration::from_millis(2000),
            stage: "Fine-tuning the interactions - users are gonna love this flow! 🚀",
        },
        ProgressStep {
            percent: 100,
            delay: Duration::from_millis(1500),
            stage: "Putting on the finishing touches...",
        },
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuildProgress {
    pub percent: u8,
    pub stage: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Completed { html: String },
    Failed { reason: String },
}

/// Advance progress along `schedule` until it runs out or `cancel` fires.
/// Nothing is published once the token is cancelled.
async fn run_progress_ticker(
    schedule: Vec<ProgressStep>,
    progress: Arc<watch::Sender<BuildProgress>>,
    cancel: CancellationToken,
) {
    for step in schedule {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(step.delay) => {
                progress.send_replace(BuildProgress {
                    percent: step.percent.min(100),
                    stage: Some(step.stage.to_string()),
                });
            }
        }
    }
}

impl ConversationSession {
    /// Start the build explicitly. Errors when the conversation is not ready
    /// or build mode has already been entered.
    pub async fn start_build(&self) -> Result<BuildOutcome, AppError> {
        {
            let state = self.state()?;
            if !state.should_transition_to_build {
                return Err(AppError::Validation(
                    "Requirements are not ready to build yet".into(),
                ));
            }
        }
        self.try_build()
            .await?
            .ok_or_else(|| AppError::Busy("Build mode already entered for this conversation".into()))
    }

    /// Run the build if readiness is signalled and build mode has not been
    /// entered yet. Returns `None` when nothing was started.
    pub(crate) async fn try_build(&self) -> Result<Option<BuildOutcome>, AppError> {
        let requirements = {
            let mut state = self.state()?;
            if !state.should_transition_to_build || !matches!(state.build, BuildPhase::Idle) {
                return Ok(None);
            }
            state.build = BuildPhase::Building;
            let started = self.new_message(BUILD_START_MESSAGE, Sender::Assistant, false, true);
            state.push(started);
            state.tracker.requirements().clone()
        };

        tracing::info!(session_id = %self.id(), "Build started");
        self.progress.send_replace(BuildProgress::default());

        let cancel = CancellationToken::new();
        let ticker = tokio::spawn(run_progress_ticker(
            self.schedule.clone(),
            Arc::clone(&self.progress),
            cancel.clone(),
        ));
        // Cancels the ticker even if this future is dropped mid-call.
        let cancel_guard = cancel.drop_guard();

        let result = self.backend.generate_html(&requirements).await;

        drop(cancel_guard);
        if let Err(e) = ticker.await {
            tracing::warn!(session_id = %self.id(), "Progress ticker ended abnormally: {}", e);
        }

        let html = result.and_then(|raw| {
            let html = strip_code_fences(&raw);
            if html.is_empty() {
                Err(AppError::Upstream("No HTML generated".into()))
            } else {
                Ok(html)
            }
        });

        let mut state = self.state()?;
        let outcome = match html {
            Ok(html) => {
                self.progress.send_replace(BuildProgress {
                    percent: 100,
                    stage: None,
                });
                state.build = BuildPhase::Built { html: html.clone() };
                let done = self.new_message(BUILD_SUCCESS_MESSAGE, Sender::Assistant, false, true);
                state.push(done);
                tracing::info!(session_id = %self.id(), length = html.len(), "Build completed");
                BuildOutcome::Completed { html }
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id(), kind = e.kind(), "Build failed: {}", e);
                self.progress.send_replace(BuildProgress::default());
                state.build = BuildPhase::Idle;
                let failed = self.new_message(BUILD_FAILURE_MESSAGE, Sender::Assistant, false, true);
                state.push(failed);
                BuildOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_walks_schedule() {
        let (tx, rx) = watch::channel(BuildProgress::default());
        let schedule = vec![
            ProgressStep {
                percent: 50,
                delay: Duration::from_millis(1),
                stage: "half",
            },
            ProgressStep {
                percent: 100,
                delay: Duration::from_millis(1),
                stage: "done",
            },
        ];
        run_progress_ticker(schedule, Arc::new(tx), CancellationToken::new()).await;
        assert_eq!(rx.borrow().percent, 100);
        assert_eq!(rx.borrow().stage.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_ticker_stops_when_cancelled() {
        let (tx, rx) = watch::channel(BuildProgress::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        run_progress_ticker(default_schedule(), Arc::new(tx), cancel).await;
        assert_eq!(rx.borrow().percent, 0);
    }

    #[test]
    fn test_default_schedule_saturates_at_100() {
        let schedule = default_schedule();
        let percents: Vec<u8> = schedule.iter().map(|s| s.percent).collect();
        assert_eq!(percents, vec![20, 40, 60, 80, 100]);
        let total: Duration = schedule.iter().map(|s| s.delay).sum();
        assert_eq!(total, Duration::from_millis(9000));
    }
}
