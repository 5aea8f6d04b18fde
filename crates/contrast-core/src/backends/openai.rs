//! OpenAI chat-completion backend (gpt-4o-mini and friends)

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::types::{ChatBackend, ChatMessage, CompletionOptions};

/// OpenAI backend
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    fn to_openai_messages(messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn backend_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let openai_messages = Self::to_openai_messages(messages);

        let body = serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        debug!(
            "OpenAI request: model={}, messages={}",
            self.model,
            openai_messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "OpenAI API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: OpenAiApiResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenAI response had no choices"))?;

        choice
            .message
            .content
            .ok_or_else(|| anyhow!("OpenAI response had no message content"))
    }
}

// ── OpenAI wire types ──

#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiApiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::types::ChatRole;

    #[test]
    fn test_to_openai_messages() {
        let msgs = vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("hello"),
        ];
        let result = OpenAiBackend::to_openai_messages(&msgs);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, "system");
        assert_eq!(result[1].role, "user");
        assert_eq!(result[1].content, "hello");
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let resp: OpenAiApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("hi"));
    }

    #[test]
    fn test_debug_hides_key() {
        let backend = OpenAiBackend::new(
            "sk-secret".to_string(),
            "gpt-4o-mini".to_string(),
            "https://api.openai.com".to_string(),
        );
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_role_serialization_matches_wire() {
        let msg = ChatMessage {
            role: ChatRole::Assistant,
            content: "ok".to_string(),
        };
        let wire = OpenAiBackend::to_openai_messages(&[msg]);
        assert_eq!(wire[0].role, "assistant");
    }
}
