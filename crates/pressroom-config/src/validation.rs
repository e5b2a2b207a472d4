// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use pressroom_core::SourceKind;

use crate::diagnostic::ConfigError;
use crate::model::{PressroomConfig, TrimmingStrategy};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &PressroomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let sources = &config.sources;
    if sources.min_poll_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "sources.min_poll_interval_secs must be at least 1",
        ));
    }
    if sources.min_poll_interval_secs > sources.max_poll_interval_secs {
        errors.push(ConfigError::validation(format!(
            "sources.min_poll_interval_secs ({}) exceeds sources.max_poll_interval_secs ({})",
            sources.min_poll_interval_secs, sources.max_poll_interval_secs
        )));
    }

    for kind in SourceKind::ALL {
        let source = sources.get(kind);
        if !source.active {
            continue;
        }
        if source.request_limit == Some(0) {
            errors.push(ConfigError::validation(format!(
                "sources.{kind}.request_limit must be at least 1 or unset"
            )));
        }
        if source.quota_window_days == 0 {
            errors.push(ConfigError::validation(format!(
                "sources.{kind}.quota_window_days must be at least 1"
            )));
        }
        let needs_rapid_endpoint = matches!(
            kind,
            SourceKind::GoogleNews | SourceKind::Medium | SourceKind::Youtube
        );
        if needs_rapid_endpoint
            && (source.endpoint.as_deref().is_none_or(str::is_empty)
                || source.host.as_deref().is_none_or(str::is_empty))
        {
            errors.push(ConfigError::validation(format!(
                "sources.{kind} is active but endpoint or host is not set"
            )));
        }
        if kind == SourceKind::Arxiv && source.topics.is_empty() {
            errors.push(ConfigError::validation(
                "sources.arxiv is active but has no topics",
            ));
        }
    }

    let producer = &config.producer;
    if producer.chunk_size == 0 {
        errors.push(ConfigError::validation("producer.chunk_size must be at least 1"));
    }
    if producer.chunk_overlap >= producer.chunk_size {
        errors.push(ConfigError::validation(format!(
            "producer.chunk_overlap ({}) must be smaller than producer.chunk_size ({})",
            producer.chunk_overlap, producer.chunk_size
        )));
    }
    if producer.poll_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "producer.poll_interval_secs must be at least 1",
        ));
    }

    let conversation = &config.conversation;
    match conversation.trimming_strategy {
        TrimmingStrategy::Token if conversation.max_tokens == 0 => {
            errors.push(ConfigError::validation(
                "conversation.max_tokens must be at least 1 with the token strategy",
            ));
        }
        TrimmingStrategy::Message if conversation.max_conversation_length == 0 => {
            errors.push(ConfigError::validation(
                "conversation.max_conversation_length must be at least 1 with the message strategy",
            ));
        }
        _ => {}
    }

    if config.suggestions.evaluation_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "suggestions.evaluation_interval_secs must be at least 1",
        ));
    }

    if config.linkedin.auth_url.trim().is_empty() {
        errors.push(ConfigError::validation("linkedin.auth_url must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
