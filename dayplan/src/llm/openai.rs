//! OpenAI API client implementation
//!
//! Implements the CompletionClient trait for OpenAI's Chat Completions API.
//! Requests are made in JSON-object response mode so the backend is biased
//! toward emitting a single well-formed document.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::LlmConfig;

/// OpenAI API client
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client from configuration
    ///
    /// Fails with `CompletionError::Configuration` when the API key is not
    /// available from the configured environment variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        debug!(model = %config.model, base_url = %config.base_url, "OpenAiClient::from_config: called");
        let api_key = config.api_key()?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the Chat Completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %request.model, %request.max_output_tokens, "OpenAiClient::build_request_body: called");

        let max_tokens = request.max_output_tokens.min(self.max_tokens);

        serde_json::json!({
            "model": request.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": request.system_block },
                { "role": "user", "content": request.user_block },
            ],
            "temperature": request.temperature,
            "max_tokens": max_tokens,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        debug!(model = %request.model, "OpenAiClient::complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        // Single attempt: upstream failures propagate to the caller, which
        // owns the retry decision.
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(%status, "OpenAiClient::complete: API error");
            return Err(CompletionError::Api { status, message });
        }

        let api_response: ChatResponse = response.json().await?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty());

        match content {
            Some(text) => {
                debug!(text_len = text.len(), "OpenAiClient::complete: success");
                Ok(text)
            }
            None => {
                debug!("OpenAiClient::complete: no text in response");
                Err(CompletionError::EmptyResponse)
            }
        }
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient {
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            max_tokens: 2000,
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_block: "You are a scheduler".to_string(),
            user_block: "{\"tasks\":[]}".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_output_tokens: 2000,
        }
    }

    #[test]
    fn test_build_request_body_shape() {
        let body = client().build_request_body(&request());

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a scheduler");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_max_tokens_capped_by_config() {
        let mut req = request();
        req.max_output_tokens = 50_000;

        let body = client().build_request_body(&req);
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{"choices":[{"message":{"content":"{\"scheduledTasks\":[]}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"scheduledTasks\":[]}")
        );
    }
}
