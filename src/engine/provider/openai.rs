//! OpenAI chat-completions provider.

use async_trait::async_trait;
use serde::Deserialize;

use super::{LanguageModel, StructuredFormat};
use crate::error::AppError;

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Longest upstream error body echoed into logs and error messages.
const MAX_ERROR_BODY: usize = 500;

pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: Option<String>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(http: reqwest::Client, api_key: String, base_url: Option<String>, model: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}/chat/completions", base.trim_end_matches('/')),
            None => OPENAI_API_URL.to_string(),
        }
    }

    fn build_request_body(
        &self,
        system: &str,
        prompt: &str,
        format: Option<&StructuredFormat>,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
        });

        if let Some(format) = format {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": format.name,
                    "strict": true,
                    "schema": format.schema,
                },
            });
        }

        body
    }

    async fn send(&self, body: serde_json::Value) -> Result<String, AppError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("openai request failed: {e}")))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("openai response unreadable: {e}")))?;

        if !status.is_success() {
            let snippet: String = body_text.chars().take(MAX_ERROR_BODY).collect();
            return Err(AppError::Upstream(format!(
                "openai returned {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body_text)
            .map_err(|e| AppError::Upstream(format!("Failed to parse openai response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "openai completion finished"
            );
        }

        parsed.into_content()
    }
}

#[async_trait]
impl LanguageModel for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete_structured(
        &self,
        system: &str,
        prompt: &str,
        format: &StructuredFormat,
    ) -> Result<String, AppError> {
        self.send(self.build_request_body(system, prompt, Some(format))).await
    }

    async fn complete_text(&self, system: &str, prompt: &str) -> Result<String, AppError> {
        self.send(self.build_request_body(system, prompt, None)).await
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> Result<String, AppError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("openai returned no choices".into()))?;
        let message = choice
            .message
            .ok_or_else(|| AppError::Upstream("openai returned no message".into()))?;
        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(AppError::Upstream(format!("openai refused: {refusal}")));
        }
        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("openai returned empty content".into()))
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
