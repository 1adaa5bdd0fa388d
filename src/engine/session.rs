//! The explicit conversation-session object: transcript, tracker, quick
//! replies and build state for one conversation, shared by `Arc`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use ts_rs::TS;

use super::backend::DesignBackend;
use super::build::{default_schedule, BuildProgress, ProgressStep};
use super::keywords::ProjectMemory;
use super::replies::rank_replies;
use super::tracker::{ConversationTracker, TrackerSnapshot};
use crate::client::BradClient;
use crate::config::{AppConfig, BuildReadinessPolicy};
use crate::error::AppError;
use crate::models::{Message, Sender, SmartReply};

/// Brad's opening lines for a fresh conversation.
pub const GREETING: [&str; 3] = [
    "Hey! 👋 I'm Brad, your personal designer. Sarah from the team introduced us - she mentioned you might need some design work?",
    "I'm basically like having a designer on retainer - always here when you need something built, redesigned, or just want to bounce ideas around.",
    "What's the first thing you'd like to work on together?",
];

/// Build mode for one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BuildPhase {
    #[default]
    Idle,
    Building,
    /// Terminal: the preview is revealed and no further build is allowed.
    Built { html: String },
}

impl BuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::Idle => "idle",
            BuildPhase::Building => "building",
            BuildPhase::Built { .. } => "built",
        }
    }
}

/// Mutable conversation data. Only the turn and build flows write to it.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    transcript: Vec<Message>,
    pub(crate) tracker: ConversationTracker,
    pub(crate) smart_replies: Vec<SmartReply>,
    pub(crate) should_transition_to_build: bool,
    pub(crate) show_quick_replies: bool,
    pub(crate) build: BuildPhase,
    pub(crate) memory: ProjectMemory,
}

impl SessionState {
    /// Append-only: the only way a message enters the transcript.
    pub(crate) fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub(crate) fn transcript(&self) -> &[Message] {
        &self.transcript
    }
}

/// Everything the rendering shell needs to draw the conversation.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub messages: Vec<Message>,
    pub quick_replies: Vec<String>,
    pub is_composing: bool,
    pub tracker: TrackerSnapshot,
    pub should_transition_to_build: bool,
    pub build_status: String,
    pub html: Option<String>,
    pub build_progress: BuildProgress,
}

pub struct ConversationSession {
    id: String,
    pub(crate) backend: Arc<dyn DesignBackend>,
    pub(crate) readiness: BuildReadinessPolicy,
    pub(crate) schedule: Vec<ProgressStep>,
    pub(crate) progress: Arc<watch::Sender<BuildProgress>>,
    state: Mutex<SessionState>,
    pub(crate) composing: AtomicBool,
    next_seq: AtomicU64,
}

impl ConversationSession {
    /// A fresh conversation opened with Brad's greeting.
    pub fn new(backend: Arc<dyn DesignBackend>) -> Self {
        let session = Self::empty(backend);
        if let Ok(mut state) = session.state() {
            for line in GREETING {
                let greeting = session.new_message(line, Sender::Assistant, false, false);
                state.push(greeting);
            }
        }
        session
    }

    /// A fresh conversation with an empty transcript.
    pub fn empty(backend: Arc<dyn DesignBackend>) -> Self {
        let (progress, _) = watch::channel(BuildProgress::default());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            backend,
            readiness: BuildReadinessPolicy::default(),
            schedule: default_schedule(),
            progress: Arc::new(progress),
            state: Mutex::new(SessionState {
                show_quick_replies: true,
                ..Default::default()
            }),
            composing: AtomicBool::new(false),
            next_seq: AtomicU64::new(1),
        }
    }

    /// A greeted conversation talking to the server at `config.api_url`,
    /// using the configured build-readiness policy.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let client = BradClient::from_config(config)?;
        Ok(Self::new(Arc::new(client)).with_readiness(config.build_readiness))
    }

    pub fn with_readiness(mut self, policy: BuildReadinessPolicy) -> Self {
        self.readiness = policy;
        self
    }

    pub fn with_progress_schedule(mut self, schedule: Vec<ProgressStep>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn readiness(&self) -> BuildReadinessPolicy {
        self.readiness
    }

    pub(crate) fn state(&self) -> Result<MutexGuard<'_, SessionState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("Conversation session lock poisoned".into()))
    }

    /// Create a message with a session-unique, increasing id.
    pub(crate) fn new_message(
        &self,
        text: &str,
        sender: Sender,
        memory_reference: bool,
        build_update: bool,
    ) -> Message {
        let now = chrono::Utc::now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        Message {
            id: format!("{}-{}", now.timestamp_millis(), seq),
            text: text.to_string(),
            sender,
            is_memory_reference: memory_reference.then_some(true),
            is_build_update: build_update.then_some(true),
            timestamp: now.to_rfc3339(),
        }
    }

    pub fn is_composing(&self) -> bool {
        self.composing.load(Ordering::Acquire)
    }

    pub fn messages(&self) -> Result<Vec<Message>, AppError> {
        Ok(self.state()?.transcript().to_vec())
    }

    pub fn tracker(&self) -> Result<TrackerSnapshot, AppError> {
        Ok(self.state()?.tracker.snapshot())
    }

    /// Quick replies for display; empty while a turn is in flight.
    pub fn quick_replies(&self) -> Result<Vec<String>, AppError> {
        let state = self.state()?;
        if !state.show_quick_replies || self.is_composing() {
            return Ok(Vec::new());
        }
        Ok(rank_replies(&state.smart_replies, state.transcript()))
    }

    pub fn build_phase(&self) -> Result<BuildPhase, AppError> {
        Ok(self.state()?.build.clone())
    }

    /// Watch the simulated build progress.
    pub fn subscribe_progress(&self) -> watch::Receiver<BuildProgress> {
        self.progress.subscribe()
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, AppError> {
        let quick_replies = self.quick_replies()?;
        let state = self.state()?;
        let html = match &state.build {
            BuildPhase::Built { html } => Some(html.clone()),
            _ => None,
        };
        Ok(SessionSnapshot {
            id: self.id.clone(),
            messages: state.transcript().to_vec(),
            quick_replies,
            is_composing: self.is_composing(),
            tracker: state.tracker.snapshot(),
            should_transition_to_build: state.should_transition_to_build,
            build_status: state.build.as_str().to_string(),
            html,
            build_progress: self.progress.borrow().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::{BradStructuredResponse, ChatApiRequest, DesignRequirements};

    struct UnusedBackend;

    #[async_trait]
    impl DesignBackend for UnusedBackend {
        async fn send_turn(&self, _: &ChatApiRequest) -> Result<BradStructuredResponse, AppError> {
            Err(AppError::Internal("not used".into()))
        }

        async fn generate_html(&self, _: &DesignRequirements) -> Result<String, AppError> {
            Err(AppError::Internal("not used".into()))
        }
    }

    #[test]
    fn test_new_session_is_greeted() {
        let session = ConversationSession::new(Arc::new(UnusedBackend));
        let messages = session.messages().unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(Message::is_assistant));
        assert_eq!(
            session.quick_replies().unwrap(),
            vec!["Landing page", "Portfolio site", "Mobile app", "Dashboard"]
        );
    }

    #[test]
    fn test_message_ids_are_unique_and_increasing() {
        let session = ConversationSession::new(Arc::new(UnusedBackend));
        let seqs: Vec<u64> = session
            .messages()
            .unwrap()
            .iter()
            .map(|m| m.id.rsplit('-').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_config_applies_readiness_policy() {
        let config = AppConfig::from_lookup(|key| match key {
            "BRAD_BUILD_READINESS" => Some("threshold:0.75".into()),
            "BRAD_API_URL" => Some("http://127.0.0.1:9999".into()),
            _ => None,
        })
        .unwrap();
        let session = ConversationSession::from_config(&config).unwrap();
        assert_eq!(
            session.readiness(),
            BuildReadinessPolicy::CompletenessThreshold(0.75)
        );
        assert_eq!(session.messages().unwrap().len(), GREETING.len());

        let default = ConversationSession::from_config(&AppConfig::default()).unwrap();
        assert_eq!(default.readiness(), BuildReadinessPolicy::ModelSignal);
    }

    #[test]
    fn test_empty_session_snapshot() {
        let session = ConversationSession::empty(Arc::new(UnusedBackend));
        let snap = session.snapshot().unwrap();
        assert!(snap.messages.is_empty());
        assert!(snap.quick_replies.is_empty());
        assert_eq!(snap.build_status, "idle");
        assert_eq!(snap.build_progress.percent, 0);
        assert_eq!(snap.tracker.completeness_score, 0.0);
        assert_eq!(snap.tracker.missing_fields.len(), 8);
        assert!(snap.html.is_none());
    }
}
