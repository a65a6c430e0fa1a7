// src/services/llm.rs

//! Minimal client for OpenAI-compatible chat-completions endpoints.

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::LlmConfig;
use crate::utils::http::create_llm_client;

/// One system + user exchange.
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub max_tokens: u32,
    /// Ask the model for a JSON object
    pub json: bool,
}

/// Chat-completions client bound to one model and API key.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = create_llm_client(&config)?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Build a client if the configured API key variable is set.
    pub fn from_env(config: &LlmConfig) -> Result<Option<Self>> {
        match config.api_key() {
            Some(key) => Ok(Some(Self::new(config.clone(), key)?)),
            None => {
                log::warn!(
                    "{} is not set; language model features are disabled",
                    config.api_key_env
                );
                Ok(None)
            }
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Send `prompt` and return the trimmed text of the first choice.
    pub async fn complete(&self, prompt: ChatPrompt<'_>) -> Result<String> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| AppError::llm("invalid API key"))?,
        );

        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: prompt.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            response_format: prompt.json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let resp = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::llm(format!("endpoint returned {status}: {text}")));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AppError::llm("response contained no choices"))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = LlmConfig {
            api_base: "http://localhost:9000/v1/".into(),
            ..LlmConfig::default()
        };
        let client = ChatClient::new(config, "key").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4",
            temperature: 0.5,
            max_tokens: 150,
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 150);

        let plain = ChatRequest {
            response_format: None,
            ..body
        };
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_from_env_without_key() {
        let config = LlmConfig {
            api_key_env: "RUFUS_TEST_UNSET_KEY_VARIABLE".into(),
            ..LlmConfig::default()
        };
        assert!(ChatClient::from_env(&config).unwrap().is_none());
    }
}
