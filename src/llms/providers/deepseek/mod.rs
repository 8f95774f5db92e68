//! DeepSeek chat-completion provider.
//!
//! Talks to the OpenAI-compatible `POST {base_url}/chat/completions` endpoint
//! via `reqwest`. Failures are returned as-is; there is no retry loop.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::base_llm::BaseLLM;
use crate::utilities::completions::Message;
use crate::utilities::errors::{ConfigurationError, LLMError};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "DEEPSEEK_BASE_URL";
/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// DeepSeek completion client.
///
/// # Example
///
/// ```ignore
/// let llm = DeepSeekCompletion::from_env()?;
/// let reply = llm.call(&[Message::user("Hello")])?;
/// ```
#[derive(Debug, Clone)]
pub struct DeepSeekCompletion {
    model: String,
    api_key: String,
    base_url: String,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Maximum tokens in the response.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout: Option<f64>,
}

impl DeepSeekCompletion {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `model` - Model identifier (e.g. "deepseek-chat").
    /// * `api_key` - Optional API key (defaults to the `DEEPSEEK_API_KEY` env var).
    /// * `base_url` - Optional base URL (defaults to `DEEPSEEK_BASE_URL`, then the public endpoint).
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ConfigurationError::MissingModel);
        }
        let api_key = api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            })?;
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: None,
            max_tokens: None,
            timeout: None,
        })
    }

    /// Default model, credentials from the environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::new(DEFAULT_MODEL, None, None)
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// The configured timeout; negative or non-finite seconds are rejected.
    fn request_timeout(&self) -> Result<Duration, LLMError> {
        let seconds = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::try_from_secs_f64(seconds)
            .map_err(|e| LLMError::Transport(format!("invalid timeout {}s: {}", seconds, e)))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn parse_response(body: &str) -> Result<String, LLMError> {
        let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
            LLMError::InvalidResponse(format!(
                "{} - body: {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })?;

        if let Some(usage) = &parsed.usage {
            log::debug!(
                "DeepSeek token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("completion_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("total_tokens").and_then(Value::as_i64).unwrap_or(0),
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LLMError::InvalidResponse("no choices in response".into()))
    }
}

#[async_trait]
impl BaseLLM for DeepSeekCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "deepseek"
    }

    fn call(&self, messages: &[Message]) -> Result<String, LLMError> {
        log::debug!(
            "DeepSeekCompletion.call: model={}, messages={}",
            self.model,
            messages.len()
        );
        let rt = tokio::runtime::Runtime::new().map_err(|e| LLMError::Runtime(e.to_string()))?;
        rt.block_on(self.acall(messages))
    }

    async fn acall(&self, messages: &[Message]) -> Result<String, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout()?)
            .build()
            .map_err(|e| LLMError::Transport(e.to_string()))?;

        let response = client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_request(messages))
            .send()
            .await
            .map_err(|e| LLMError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LLMError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::warn!("DeepSeek API returned {}", status);
            return Err(LLMError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_and_base_url() {
        let llm = DeepSeekCompletion::new(
            "deepseek-chat",
            Some("sk-test".into()),
            Some("http://localhost:8080/".into()),
        )
        .unwrap();
        assert_eq!(llm.model(), "deepseek-chat");
        assert_eq!(llm.endpoint(), "http://localhost:8080/chat/completions");
    }

    #[test]
    fn test_empty_model_is_configuration_error() {
        let err = DeepSeekCompletion::new("  ", Some("sk-test".into()), None).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingModel);
    }

    #[test]
    fn test_blank_key_is_configuration_error() {
        let err = DeepSeekCompletion::new("deepseek-chat", Some(String::new()), None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential { .. }));
    }

    #[test]
    fn test_invalid_timeout_is_transport_error() {
        let llm = DeepSeekCompletion::new("deepseek-chat", Some("k".into()), None).unwrap();
        assert_eq!(
            llm.clone().timeout(2.5).request_timeout().unwrap(),
            Duration::from_millis(2500)
        );
        for seconds in [-1.0, f64::NAN, f64::INFINITY] {
            let err = llm.clone().timeout(seconds).request_timeout().unwrap_err();
            assert!(matches!(err, LLMError::Transport(ref msg) if msg.contains("invalid timeout")));
        }
    }

    #[test]
    fn test_request_body_shape() {
        let llm = DeepSeekCompletion::new("deepseek-chat", Some("k".into()), None)
            .unwrap()
            .temperature(0.2);
        let messages = vec![Message::system("s"), Message::user("u")];
        let body = serde_json::to_value(llm.build_request(&messages)).unwrap();
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.2);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}],
                       "usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#;
        assert_eq!(DeepSeekCompletion::parse_response(body).unwrap(), "hello");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = DeepSeekCompletion::parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }
}
