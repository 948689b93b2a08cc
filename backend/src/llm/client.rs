use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{LlmConfig, LlmProvider};
use crate::llm::anthropic::AnthropicClient;
use crate::llm::openai::OpenAiClient;

pub const DEFAULT_MAX_TOKENS: u32 = 1400;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// A text-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;

    fn model(&self) -> String;
}

pub type SharedLlm = Arc<dyn LlmClient>;

pub(crate) fn http_client(timeout_seconds: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Client for `provider`, or the configured one when `None`.
pub fn build_llm_client(config: &LlmConfig, provider: Option<LlmProvider>) -> SharedLlm {
    match provider.unwrap_or(config.provider) {
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
            config.timeout_seconds,
        )),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            config.anthropic_api_key.clone(),
            config.claude_model.clone(),
            config.timeout_seconds,
        )),
    }
}

/// The configured client; empty when the selected provider has no API key.
#[derive(Clone, Default)]
pub struct LlmHandle {
    pub client: Option<SharedLlm>,
}

impl LlmHandle {
    pub fn from_config(config: &LlmConfig) -> Self {
        if config.active_api_key().trim().is_empty() {
            return Self::default();
        }
        Self {
            client: Some(build_llm_client(config, None)),
        }
    }

    pub fn get(&self) -> Option<&dyn LlmClient> {
        self.client.as_deref()
    }

    pub fn model(&self) -> Option<String> {
        self.client.as_ref().map(|c| c.model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    #[test]
    fn test_build_uses_configured_provider() {
        let mut config = Config::for_storage(Path::new("/tmp/unused")).llm;
        assert_eq!(build_llm_client(&config, None).model(), "claude-opus-4-5");

        config.provider = LlmProvider::OpenAi;
        assert_eq!(build_llm_client(&config, None).model(), "gpt-4o");
        assert_eq!(
            build_llm_client(&config, Some(LlmProvider::Anthropic)).model(),
            "claude-opus-4-5"
        );
    }

    #[test]
    fn test_handle_needs_api_key() {
        let mut config = Config::for_storage(Path::new("/tmp/unused")).llm;
        assert!(LlmHandle::from_config(&config).get().is_none());

        config.anthropic_api_key = "sk-test".to_string();
        let handle = LlmHandle::from_config(&config);
        assert_eq!(handle.model().as_deref(), Some("claude-opus-4-5"));
    }

    #[tokio::test]
    async fn test_mock_client() {
        let mut mock = MockLlmClient::new();
        mock.expect_generate()
            .returning(|_, user, _, _| Ok(format!("echo: {}", user)));
        let out = mock.generate("sys", "hi", 10, 0.0).await.unwrap();
        assert_eq!(out, "echo: hi");
    }
}
