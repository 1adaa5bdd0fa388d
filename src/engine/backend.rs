use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{BradStructuredResponse, ChatApiRequest, DesignRequirements};

/// The two request/response boundaries a conversation session talks to.
///
/// Implemented over HTTP by [`crate::client::BradClient`] and in-process by
/// [`crate::engine::service::DesignService`].
#[async_trait]
pub trait DesignBackend: Send + Sync {
    /// Turn endpoint: one structured, schema-valid turn.
    async fn send_turn(&self, request: &ChatApiRequest) -> Result<BradStructuredResponse, AppError>;

    /// Generation endpoint: a complete HTML document for the final requirements.
    async fn generate_html(&self, requirements: &DesignRequirements) -> Result<String, AppError>;
}
