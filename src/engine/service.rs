//! Server-side handling of both endpoints: prompt assembly, the model call,
//! and boundary validation of what comes back.

use std::sync::Arc;

use async_trait::async_trait;

use super::backend::DesignBackend;
use super::parser::{extract_json_object, strip_code_fences};
use super::prompt::{
    build_html_prompt, build_turn_prompt, BRAD_SYSTEM_INSTRUCTION, HTML_SYSTEM_INSTRUCTION,
};
use super::provider::openai::OpenAiProvider;
use super::provider::{LanguageModel, StructuredFormat};
use super::schema::{response_schema, validate_structured_turn, RESPONSE_SCHEMA_NAME};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{BradStructuredResponse, ChatApiRequest, DesignRequirements};
use crate::validation::require_non_empty;

pub struct DesignService {
    chat_model: Arc<dyn LanguageModel>,
    html_model: Arc<dyn LanguageModel>,
    format: StructuredFormat,
}

impl DesignService {
    pub fn new(chat_model: Arc<dyn LanguageModel>, html_model: Arc<dyn LanguageModel>) -> Self {
        Self {
            chat_model,
            html_model,
            format: StructuredFormat {
                name: RESPONSE_SCHEMA_NAME,
                schema: response_schema(),
            },
        }
    }

    /// Build the OpenAI-backed service. Fails closed when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| AppError::Config("Missing OPENAI_API_KEY".into()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        let chat: Arc<dyn LanguageModel> = Arc::new(OpenAiProvider::new(
            http.clone(),
            api_key.clone(),
            config.openai_base_url.clone(),
            config.chat_model.clone(),
        ));
        let html: Arc<dyn LanguageModel> = Arc::new(OpenAiProvider::new(
            http,
            api_key,
            config.openai_base_url.clone(),
            config.html_model.clone(),
        ));
        Ok(Self::new(chat, html))
    }

    /// Run one structured turn and validate it against the response schema.
    #[tracing::instrument(skip_all, fields(history = request.conversation_history.len()))]
    pub async fn structured_turn(
        &self,
        request: &ChatApiRequest,
    ) -> Result<BradStructuredResponse, AppError> {
        require_non_empty("message", &request.message)?;

        let prompt = build_turn_prompt(
            &request.message,
            &request.conversation_history,
            request.current_requirements.as_ref(),
        );
        let raw = self
            .chat_model
            .complete_structured(BRAD_SYSTEM_INSTRUCTION, &prompt, &self.format)
            .await?;

        let value = extract_json_object(&raw)
            .ok_or_else(|| AppError::Schema("model reply contained no JSON object".into()))?;
        let turn = validate_structured_turn(value)?;

        tracing::info!(
            provider = self.chat_model.name(),
            phase = ?turn.conversation_state.phase,
            smart_replies = turn.smart_replies.len(),
            ready = turn.should_transition_to_build,
            "Structured turn completed"
        );
        Ok(turn)
    }

    /// Generate the final page and strip any markdown fencing from it.
    #[tracing::instrument(skip_all)]
    pub async fn generate_page(&self, requirements: &DesignRequirements) -> Result<String, AppError> {
        let prompt = build_html_prompt(requirements);
        let raw = self
            .html_model
            .complete_text(HTML_SYSTEM_INSTRUCTION, &prompt)
            .await?;

        let html = strip_code_fences(&raw);
        if html.is_empty() {
            return Err(AppError::Upstream("No HTML generated".into()));
        }
        tracing::info!(provider = self.html_model.name(), length = html.len(), "Generated HTML");
        Ok(html)
    }
}

#[async_trait]
impl DesignBackend for DesignService {
    async fn send_turn(&self, request: &ChatApiRequest) -> Result<BradStructuredResponse, AppError> {
        self.structured_turn(request).await
    }

    async fn generate_html(&self, requirements: &DesignRequirements) -> Result<String, AppError> {
        self.generate_page(requirements).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Canned model that records the prompts it receives.
    struct ScriptedModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(String::from).map_err(String::from),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn respond(&self, prompt: &str) -> Result<String, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(AppError::Upstream)
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete_structured(
            &self,
            _system: &str,
            prompt: &str,
            format: &StructuredFormat,
        ) -> Result<String, AppError> {
            assert_eq!(format.name, RESPONSE_SCHEMA_NAME);
            self.respond(prompt)
        }

        async fn complete_text(&self, _system: &str, prompt: &str) -> Result<String, AppError> {
            self.respond(prompt)
        }
    }

    const VALID_TURN: &str = r#"{
        "response": "A photography portfolio! What's the business called?",
        "smartReplies": [{"text": "Lumen Studio", "category": "direct-answer", "relevanceScore": 0.8}],
        "conversationState": {"phase": "requirements", "userIntent": "Photography portfolio"},
        "designRequirements": {
            "designType": "portfolio", "subject": "photography business", "subjectName": null,
            "purpose": null, "preferredStyleAndInspiration": null, "colorPreferences": null,
            "functionalityNeeds": null, "contentTypes": null
        },
        "suggestedActions": [],
        "confidenceScore": 0.6,
        "shouldTransitionToBuild": false
    }"#;

    fn request(message: &str) -> ChatApiRequest {
        ChatApiRequest {
            message: message.into(),
            conversation_history: vec![],
            current_requirements: None,
        }
    }

    fn service(model: Arc<ScriptedModel>) -> DesignService {
        DesignService::new(model.clone(), model)
    }

    #[test]
    fn test_from_config_fails_closed_without_key() {
        let result = DesignService::from_config(&AppConfig::default());
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("OPENAI_API_KEY")));
    }

    #[tokio::test]
    async fn test_structured_turn_validates_reply() {
        let model = ScriptedModel::new(Ok(VALID_TURN));
        let turn = service(model.clone())
            .structured_turn(&request("Let's build a portfolio for my photography business"))
            .await
            .unwrap();
        assert_eq!(
            turn.design_requirements.subject.as_deref(),
            Some("photography business")
        );
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("None gathered yet."));
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_model() {
        let model = ScriptedModel::new(Ok(VALID_TURN));
        let result = service(model.clone()).structured_turn(&request("  ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_reply_is_schema_error() {
        let model = ScriptedModel::new(Ok(r#"{"response": "hi"}"#));
        let result = service(model).structured_turn(&request("hello")).await;
        assert!(matches!(result, Err(AppError::Schema(_))));

        let model = ScriptedModel::new(Ok("I'd rather just chat."));
        let result = service(model).structured_turn(&request("hello")).await;
        assert!(matches!(result, Err(AppError::Schema(_))));
    }

    #[tokio::test]
    async fn test_generate_page_strips_fences() {
        let model = ScriptedModel::new(Ok("```html\n<html>...</html>\n```"));
        let html = service(model).generate_page(&DesignRequirements::default()).await.unwrap();
        assert_eq!(html, "<html>...</html>");
    }

    #[tokio::test]
    async fn test_generate_page_rejects_blank_output() {
        let model = ScriptedModel::new(Ok("```html\n```"));
        let result = service(model).generate_page(&DesignRequirements::default()).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let model = ScriptedModel::new(Err("openai returned 500"));
        let result = service(model).structured_turn(&request("hello")).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
