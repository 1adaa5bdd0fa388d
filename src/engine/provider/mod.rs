pub mod openai;

use async_trait::async_trait;

use crate::error::AppError;

/// A JSON schema the model's reply must conform to.
#[derive(Debug, Clone)]
pub struct StructuredFormat {
    pub name: &'static str,
    pub schema: serde_json::Value,
}

// =============================================================================
// LanguageModel trait
// =============================================================================

/// Abstraction over the hosted language model behind both endpoints.
///
/// Implementations make exactly one request per call: no retries, no local
/// timeout. Transport failures, non-2xx statuses and empty replies all
/// surface as `AppError::Upstream`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &'static str;

    /// Run a schema-constrained completion and return the raw reply text.
    async fn complete_structured(
        &self,
        system: &str,
        prompt: &str,
        format: &StructuredFormat,
    ) -> Result<String, AppError>;

    /// Run a free-text completion and return the reply text.
    async fn complete_text(&self, system: &str, prompt: &str) -> Result<String, AppError>;
}
