use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::engine::schema::validate_structured_turn;
use crate::engine::DesignBackend;
use crate::error::AppError;
use crate::models::{
    BradStructuredResponse, ChatApiRequest, DesignRequirements,
    GenerateHtmlRequest, GenerateHtmlResponse,
};

// ============================================================================
// Helper
// ============================================================================

/// Convert any displayable transport error into `AppError::Upstream`.
fn upstream_err(e: impl std::fmt::Display) -> AppError {
    AppError::Upstream(e.to_string())
}

/// Response envelopes shared by both endpoints.
trait Envelope {
    fn success(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

/// Turn envelope with `data` left raw so it can be checked against the
/// response schema before decoding.
#[derive(Debug, Deserialize)]
struct RawChatEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl Envelope for RawChatEnvelope {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Envelope for GenerateHtmlResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// ============================================================================
// BradClient
// ============================================================================

/// HTTP client for a running Brad server's turn and generation endpoints.
///
/// No request timeout is set; a slow model call runs as long as the server lets it.
pub struct BradClient {
    http: reqwest::Client,
    base_url: String,
}

impl BradClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(format!("{}{}", self.base_url, path))
    }

    /// Send a request and decode the `{ success, ... }` envelope. Non-2xx
    /// statuses and `success: false` both surface as `Upstream` errors.
    async fn send_json<T: DeserializeOwned + Envelope>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let response = req.send().await.map_err(upstream_err)?;
        let status = response.status();
        let body = response.text().await.map_err(upstream_err)?;

        let envelope: Option<T> = serde_json::from_str(&body).ok();
        match envelope {
            Some(envelope) if status.is_success() && envelope.success() => Ok(envelope),
            Some(envelope) => Err(AppError::Upstream(format!(
                "server returned {}: {}",
                status.as_u16(),
                envelope.error().unwrap_or("request failed")
            ))),
            None if status.is_success() => Err(AppError::Schema(
                "server response did not match the expected envelope".into(),
            )),
            None => Err(AppError::Upstream(format!("server returned {}", status.as_u16()))),
        }
    }

    /// `POST /api/chat` -- one structured turn. The payload is validated
    /// against the response schema; a partial turn is a `Schema` error.
    pub async fn chat(&self, request: &ChatApiRequest) -> Result<BradStructuredResponse, AppError> {
        let envelope: RawChatEnvelope = self.send_json(self.post("/api/chat").json(request)).await?;
        let data = envelope
            .data
            .ok_or_else(|| AppError::Schema("turn response carried no data".into()))?;
        validate_structured_turn(data)
    }

    /// `POST /api/generate-html` -- the final page for the given requirements.
    pub async fn generate_html(&self, requirements: &DesignRequirements) -> Result<String, AppError> {
        let body = GenerateHtmlRequest {
            design_requirements: requirements.clone(),
        };
        let envelope: GenerateHtmlResponse = self
            .send_json(self.post("/api/generate-html").json(&body))
            .await?;
        envelope
            .html
            .filter(|html| !html.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("No HTML generated".into()))
    }
}

#[async_trait]
impl DesignBackend for BradClient {
    async fn send_turn(&self, request: &ChatApiRequest) -> Result<BradStructuredResponse, AppError> {
        self.chat(request).await
    }

    async fn generate_html(&self, requirements: &DesignRequirements) -> Result<String, AppError> {
        BradClient::generate_html(self, requirements).await
    }
}
