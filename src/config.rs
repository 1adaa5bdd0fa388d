//! Process configuration, resolved once at startup from the environment
//! (with `.env` files layered underneath via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9430";
const DEFAULT_CHAT_MODEL: &str = "gpt-5";
const DEFAULT_HTML_MODEL: &str = "gpt-5-nano";

/// How a session decides that enough has been gathered to start building.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BuildReadinessPolicy {
    /// Trust the model's `shouldTransitionToBuild` flag.
    #[default]
    ModelSignal,
    /// Build once the locally computed completeness reaches the threshold.
    CompletenessThreshold(f64),
}

impl BuildReadinessPolicy {
    /// Parse `model` or `threshold:<0..1>`.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("model") {
            return Ok(BuildReadinessPolicy::ModelSignal);
        }
        if let Some(raw) = s.strip_prefix("threshold:") {
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid readiness threshold '{raw}'")))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "Readiness threshold must be within [0, 1], got {value}"
                )));
            }
            return Ok(BuildReadinessPolicy::CompletenessThreshold(value));
        }
        Err(AppError::Config(format!(
            "Unknown build readiness policy '{s}' (expected 'model' or 'threshold:<0..1>')"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means every model-backed endpoint fails closed.
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub chat_model: String,
    pub html_model: String,
    pub bind_addr: SocketAddr,
    /// Base URL the HTTP client uses to reach a running server.
    pub api_url: String,
    pub build_readiness: BuildReadinessPolicy,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let bind_addr: SocketAddr = DEFAULT_BIND_ADDR
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 9430)));
        Self {
            openai_api_key: None,
            openai_base_url: None,
            chat_model: DEFAULT_CHAT_MODEL.into(),
            html_model: DEFAULT_HTML_MODEL.into(),
            bind_addr,
            api_url: format!("http://{bind_addr}"),
            build_readiness: BuildReadinessPolicy::default(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from `.env` files and the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        // Missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is a thin wrapper.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let first = |keys: &[&str]| first_nonempty(&lookup, keys);
        let mut config = AppConfig::default();

        config.openai_api_key = first(&["OPENAI_API_KEY"]);

        if let Some(base) = first(&["OPENAI_BASE_URL", "BRAD_OPENAI_BASE_URL"]) {
            url::Url::parse(&base)
                .map_err(|e| AppError::Config(format!("Invalid OPENAI_BASE_URL '{base}': {e}")))?;
            config.openai_base_url = Some(base);
        }
        if let Some(model) = first(&["BRAD_CHAT_MODEL"]) {
            config.chat_model = model;
        }
        if let Some(model) = first(&["BRAD_HTML_MODEL"]) {
            config.html_model = model;
        }
        if let Some(addr) = first(&["BRAD_BIND_ADDR"]) {
            config.bind_addr = addr
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid BRAD_BIND_ADDR '{addr}'")))?;
            config.api_url = format!("http://{}", config.bind_addr);
        }
        if let Some(api_url) = first(&["BRAD_API_URL"]) {
            url::Url::parse(&api_url)
                .map_err(|e| AppError::Config(format!("Invalid BRAD_API_URL '{api_url}': {e}")))?;
            config.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(policy) = first(&["BRAD_BUILD_READINESS"]) {
            config.build_readiness = BuildReadinessPolicy::parse(&policy)?;
        }
        config.log_dir = first(&["BRAD_LOG_DIR"]).map(PathBuf::from);

        Ok(config)
    }
}

/// Return the first non-empty value from the given keys.
fn first_nonempty(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = lookup(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
