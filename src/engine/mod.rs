pub mod backend;
pub mod build;
pub mod keywords;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod replies;
pub mod requirements;
pub mod schema;
pub mod service;
pub mod session;
pub mod tracker;
pub mod turn;

pub use backend::DesignBackend;
pub use build::{BuildOutcome, BuildProgress, ProgressStep};
pub use service::DesignService;
pub use session::{BuildPhase, ConversationSession, SessionSnapshot};
pub use tracker::{ConversationTracker, TrackerSnapshot};
pub use turn::TurnOutcome;
