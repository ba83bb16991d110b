//! # Generator Configuration

use std::time::Duration;

/// Default endpoint root (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for [`ChatCompletionsGenerator`](crate::ChatCompletionsGenerator).
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use flashdeck_ai::AiConfig;
///
/// let config = AiConfig::default()
///     .api_key("sk-test")
///     .model("gpt-4o")
///     .timeout(Duration::from_secs(30));
///
/// assert!(config.is_configured());
/// assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
/// ```
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Bearer token for the service. `None` disables generation.
    pub api_key: Option<String>,

    /// Root URL, without the `/chat/completions` suffix.
    pub base_url: String,

    /// Model name sent with every request.
    pub model: String,

    /// Whole-request timeout.
    pub timeout: Duration,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: 0.7,
        }
    }
}

impl AiConfig {
    /// Sets the API key. Blank keys count as unset.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
