// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic generation adapter for Pressroom.
//!
//! Implements [`GenerationModel`] on top of the Messages API. Conversation
//! turns are mapped onto the user/assistant alternation the API requires.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use pressroom_config::model::{AnthropicConfig, PressroomConfig};
use pressroom_core::{
    AdapterType, GenerationModel, HealthStatus, PluginAdapter, PressroomError, Turn, TurnRole,
};
use tracing::{debug, info, warn};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Used when the history opens with an agent turn and no operator message.
const OPENING_REQUEST: &str = "Write a post about this source.";

/// Fallback system prompt when neither a file nor an inline prompt is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional social media writer. \
Turn the source material you are given into a single engaging post of at most 1300 characters. \
Open with a strong hook, keep paragraphs short, mark key phrases with **bold** and finish with \
three to five relevant hashtags. Reply with the post text only.";

/// Anthropic Messages API generation model.
pub struct AnthropicModel {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl AnthropicModel {
    pub fn new(config: &PressroomConfig) -> Result<Self, PressroomError> {
        Self::from_section(&config.anthropic)
    }

    pub fn from_section(config: &AnthropicConfig) -> Result<Self, PressroomError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = %config.default_model, "Anthropic generation model initialized");

        Ok(Self {
            client,
            model: config.default_model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    #[cfg(test)]
    fn with_client(client: AnthropicClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            max_tokens: 256,
        }
    }

    fn build_request(&self, prompt: &str, history: &[Turn]) -> MessageRequest {
        let (system, messages) = to_api_messages(prompt, history);
        MessageRequest {
            model: self.model.clone(),
            messages,
            system,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicModel {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationModel for AnthropicModel {
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, PressroomError> {
        let request = self.build_request(prompt, history);
        debug!(messages = request.messages.len(), "sending generation request");

        let response = self.client.complete_message(&request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(PressroomError::generation("model returned an empty response"));
        }
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "generation complete"
        );
        Ok(text)
    }
}

/// Maps turns plus a trailing prompt to a system prompt and an alternating
/// message list that starts and ends with a user message.
fn to_api_messages(prompt: &str, history: &[Turn]) -> (Option<String>, Vec<ApiMessage>) {
    let mut system = None;
    let mut messages: Vec<ApiMessage> = Vec::new();

    let mut push = |role: &str, content: &str| match messages.last_mut() {
        Some(last) if last.role == role => {
            last.content.push_str("\n\n");
            last.content.push_str(content);
        }
        _ => messages.push(ApiMessage {
            role: role.to_string(),
            content: content.to_string(),
        }),
    };

    for turn in history {
        match turn.role {
            TurnRole::System => {
                if system.is_none() {
                    system = Some(turn.content.clone());
                }
            }
            TurnRole::Operator => push("user", &turn.content),
            TurnRole::Agent => push("assistant", &turn.content),
        }
    }
    push("user", prompt);

    if messages.first().is_some_and(|m| m.role == "assistant") {
        messages.insert(0, ApiMessage::user(OPENING_REQUEST));
    }

    (system, messages)
}

/// Resolves the API key: config value first, then `ANTHROPIC_API_KEY`.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, PressroomError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        PressroomError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}

/// Loads the post-writer system prompt: file, then inline, then the default.
pub async fn load_system_prompt(config: &AnthropicConfig) -> String {
    if let Some(file_path) = &config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim().to_string();
                if !trimmed.is_empty() {
                    info!(path = %file_path, "loaded system prompt from file");
                    return trimmed;
                }
            }
            Err(e) => {
                warn!(
                    path = %file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = &config.system_prompt
        && !prompt.is_empty()
    {
        return prompt.clone();
    }

    DEFAULT_SYSTEM_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn roles(messages: &[ApiMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.role.as_str()).collect()
    }

    #[test]
    fn system_turn_becomes_system_prompt() {
        let history = vec![Turn::system("write posts"), Turn::agent("draft one")];
        let (system, messages) = to_api_messages("shorter please", &history);
        assert_eq!(system.as_deref(), Some("write posts"));
        assert_eq!(roles(&messages), vec!["user", "assistant", "user"]);
        assert_eq!(messages[0].content, OPENING_REQUEST);
        assert_eq!(messages[2].content, "shorter please");
    }

    #[test]
    fn consecutive_operator_turns_are_merged() {
        let history = vec![
            Turn::system("s"),
            Turn::operator("source json"),
            Turn::agent("draft"),
            Turn::operator("add emoji"),
        ];
        let (_, messages) = to_api_messages("and a hashtag", &history);
        assert_eq!(roles(&messages), vec!["user", "assistant", "user"]);
        assert_eq!(messages[2].content, "add emoji\n\nand a hashtag");
    }

    #[test]
    fn empty_history_is_a_single_user_message() {
        let (system, messages) = to_api_messages("hello", &[]);
        assert!(system.is_none());
        assert_eq!(messages, vec![ApiMessage::user("hello")]);
    }

    #[test]
    fn resolve_api_key_prefers_config() {
        assert_eq!(
            resolve_api_key(&Some("sk-test-123".into())).unwrap(),
            "sk-test-123"
        );
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        // Succeeds only when the environment provides a key.
        match resolve_api_key(&None) {
            Ok(key) => assert!(!key.is_empty()),
            Err(err) => assert!(err.to_string().contains("API key not found"), "got: {err}"),
        }
    }

    #[tokio::test]
    async fn system_prompt_default() {
        let prompt = load_system_prompt(&AnthropicConfig::default()).await;
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn system_prompt_file_overrides_inline() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prompt.md");
        std::fs::write(&file, "  From file.\n").unwrap();
        let config = AnthropicConfig {
            system_prompt: Some("Inline.".into()),
            system_prompt_file: Some(file.to_string_lossy().into_owned()),
            ..AnthropicConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "From file.");
    }

    #[tokio::test]
    async fn missing_prompt_file_falls_back_to_inline() {
        let config = AnthropicConfig {
            system_prompt: Some("Inline.".into()),
            system_prompt_file: Some("/nonexistent/prompt.md".into()),
            ..AnthropicConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "Inline.");
    }

    #[tokio::test]
    async fn generate_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "system": "write posts",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "A fresh post"}],
                "model": "claude-test",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("sk", "2023-06-01", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        let model = AnthropicModel::with_client(client, "claude-test");
        let out = model
            .generate("{\"title\":\"x\"}", &[Turn::system("write posts")])
            .await
            .unwrap();
        assert_eq!(out, "A fresh post");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "type": "message",
                "role": "assistant",
                "content": [],
                "model": "claude-test",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 1, "output_tokens": 0}
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::new("sk", "2023-06-01", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        let model = AnthropicModel::with_client(client, "claude-test");
        let err = model.generate("hi", &[]).await.unwrap_err();
        assert_eq!(err.code(), "generation_failed");
    }
}
