use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::llm::client::{http_client, LlmClient};

const GPT5_MIN_COMPLETION_TOKENS: u32 = 4000;
const FALLBACK_MODEL: &str = "gpt-4o";
const FALLBACK_MAX_TOKENS: u32 = 1200;

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

fn is_gpt5(model: &str) -> bool {
    model.starts_with("gpt-5")
}

/// Chat completion body; `gpt-5*` models take `max_completion_tokens` and no temperature.
fn chat_body(model: &str, system_prompt: &str, user_prompt: &str, max_tokens: u32, temperature: Option<f32>) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
        "response_format": {"type": "text"},
    });
    if is_gpt5(model) {
        body["max_completion_tokens"] = json!(max_tokens.max(GPT5_MIN_COMPLETION_TOKENS));
    } else {
        body["max_tokens"] = json!(max_tokens);
        if let Some(t) = temperature {
            body["temperature"] = json!(t);
        }
    }
    body
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: String, timeout_seconds: u64) -> Self {
        info!("OpenAI base_url: {}", base_url);
        Self {
            api_key,
            model,
            base_url,
            http: http_client(timeout_seconds),
        }
    }

    async fn chat(&self, model: &str, system_prompt: &str, user_prompt: &str, max_tokens: u32, temperature: Option<f32>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&chat_body(model, system_prompt, user_prompt, max_tokens, temperature))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("OpenAI request failed ({}): {}", status, text);
        }

        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        if content.is_empty() {
            warn!("OpenAI chat returned empty content. model={}", model);
        }
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY is missing. Set it in .env.");
        }

        if !is_gpt5(&self.model) {
            return self
                .chat(&self.model, system_prompt, user_prompt, max_tokens, Some(temperature))
                .await;
        }

        let text = self
            .chat(&self.model, system_prompt, user_prompt, max_tokens, None)
            .await?;
        if !text.is_empty() {
            return Ok(text);
        }
        warn!("GPT-5 chat returned empty; falling back to {}", FALLBACK_MODEL);
        self.chat(
            FALLBACK_MODEL,
            system_prompt,
            user_prompt,
            max_tokens.min(FALLBACK_MAX_TOKENS),
            Some(temperature),
        )
        .await
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let client = OpenAiClient::new(
            String::new(),
            "gpt-4o".to_string(),
            "https://api.openai.com/v1".to_string(),
            5,
        );
        let err = client.generate("s", "u", 10, 0.2).await.unwrap_err();
        assert!(err.to_string().starts_with("OPENAI_API_KEY is missing"));
    }

    #[test]
    fn test_gpt5_body_boosts_tokens_and_drops_temperature() {
        let body = chat_body("gpt-5-mini", "s", "u", 600, Some(0.2));
        assert_eq!(body["max_completion_tokens"], 4000);
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_regular_body() {
        let body = chat_body("gpt-4o", "s", "u", 600, Some(0.0));
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][1]["content"], "u");
    }
}
