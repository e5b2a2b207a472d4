// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use pressroom_core::SourceKind;
use serde::{Deserialize, Serialize};

/// Top-level Pressroom configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PressroomConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Operator channel (Telegram bot).
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Generation model (Anthropic Messages API).
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Publishing platform.
    #[serde(default)]
    pub linkedin: LinkedInConfig,

    /// Shared RapidAPI credentials for the news, Medium and YouTube sources.
    #[serde(default)]
    pub rapid: RapidConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub producer: ProducerConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub suggestions: SuggestionsConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "pressroom".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("pressroom").join("pressroom.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("pressroom.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the operator channel.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user ids or usernames allowed to talk to the bot.
    /// Empty means anyone may reach the bot; the controller still binds
    /// to the first identity that sends `start`.
    #[serde(default)]
    pub allowed_users: Vec<String>,

    /// Where documents sent to the bot are saved before being queued for
    /// the manual source.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_users: Vec::new(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

fn default_downloads_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("pressroom").join("received"))
        .unwrap_or_else(|| std::path::PathBuf::from("received"))
        .to_string_lossy()
        .into_owned()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_anthropic_timeout")]
    pub timeout_secs: u64,

    /// Inline system prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            timeout_secs: default_anthropic_timeout(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_anthropic_timeout() -> u64 {
    120
}

/// LinkedIn publishing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinkedInConfig {
    /// OAuth access token. `None` makes every publish ask for re-authentication.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Member id used to build the `urn:li:person:<id>` author.
    #[serde(default)]
    pub author_id: Option<String>,

    /// Text appended after a blank line to every post.
    #[serde(default)]
    pub footer: Option<String>,

    /// Where the operator goes to refresh the token.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_linkedin_api")]
    pub api_base_url: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            author_id: None,
            footer: None,
            auth_url: default_auth_url(),
            api_base_url: default_linkedin_api(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_auth_url() -> String {
    "https://www.linkedin.com/oauth/v2/authorization".to_string()
}

fn default_linkedin_api() -> String {
    "https://api.linkedin.com".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

/// RapidAPI credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RapidConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for RapidConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Sources scheduler configuration and the per-source tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// Run due sources strictly one after another instead of concurrently.
    #[serde(default)]
    pub one_by_one: bool,

    /// Lower bound on the scheduler sleep between cycles.
    #[serde(default = "default_min_poll")]
    pub min_poll_interval_secs: u64,

    /// Upper bound on the scheduler sleep between cycles.
    #[serde(default = "default_max_poll")]
    pub max_poll_interval_secs: u64,

    /// Timeout for one adapter fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Candidates whose content is not longer than this are dropped.
    #[serde(default = "default_minimum_content_length")]
    pub minimum_content_length: usize,

    /// Paragraphs not longer than this are stripped from content.
    #[serde(default = "default_paragraph_min_length")]
    pub paragraph_min_length: usize,

    #[serde(default = "SourceConfig::arxiv")]
    pub arxiv: SourceConfig,

    #[serde(default = "SourceConfig::google_news")]
    pub google_news: SourceConfig,

    #[serde(default = "SourceConfig::medium")]
    pub medium: SourceConfig,

    #[serde(default = "SourceConfig::youtube")]
    pub youtube: SourceConfig,

    #[serde(default = "SourceConfig::manual")]
    pub manual: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            one_by_one: false,
            min_poll_interval_secs: default_min_poll(),
            max_poll_interval_secs: default_max_poll(),
            fetch_timeout_secs: default_fetch_timeout(),
            minimum_content_length: default_minimum_content_length(),
            paragraph_min_length: default_paragraph_min_length(),
            arxiv: SourceConfig::arxiv(),
            google_news: SourceConfig::google_news(),
            medium: SourceConfig::medium(),
            youtube: SourceConfig::youtube(),
            manual: SourceConfig::manual(),
        }
    }
}

impl SourcesConfig {
    pub fn get(&self, kind: SourceKind) -> &SourceConfig {
        match kind {
            SourceKind::Arxiv => &self.arxiv,
            SourceKind::GoogleNews => &self.google_news,
            SourceKind::Medium => &self.medium,
            SourceKind::Youtube => &self.youtube,
            SourceKind::Manual => &self.manual,
        }
    }
}

fn default_min_poll() -> u64 {
    60
}

fn default_max_poll() -> u64 {
    3600
}

fn default_fetch_timeout() -> u64 {
    300
}

fn default_minimum_content_length() -> usize {
    50
}

fn default_paragraph_min_length() -> usize {
    10
}

/// Settings for one source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_true")]
    pub active: bool,

    /// Days between two runs of this source.
    #[serde(default = "default_execution_period")]
    pub execution_period_days: u32,

    /// Requests allowed per quota window. `None` means unlimited.
    #[serde(default)]
    pub request_limit: Option<u32>,

    #[serde(default = "default_quota_window")]
    pub quota_window_days: u32,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Search topics or categories.
    #[serde(default)]
    pub topics: Vec<String>,

    /// API endpoint override.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// `x-rapidapi-host` header value for RapidAPI sources.
    #[serde(default)]
    pub host: Option<String>,

    /// Directory scanned for dropped-in documents (manual source only).
    #[serde(default)]
    pub inbox_dir: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            active: true,
            execution_period_days: default_execution_period(),
            request_limit: None,
            quota_window_days: default_quota_window(),
            max_results: default_max_results(),
            topics: Vec::new(),
            endpoint: None,
            host: None,
            inbox_dir: None,
        }
    }
}

impl SourceConfig {
    pub fn arxiv() -> Self {
        Self {
            topics: [
                "math.AG", "cs.AI", "cs.GT", "cs.CV", "cs.ET", "cs.IR", "cs.LG", "cs.NE",
                "cs.PL", "cs.RO",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            endpoint: Some("http://export.arxiv.org/api/query".to_string()),
            ..Self::default()
        }
    }

    pub fn google_news() -> Self {
        Self {
            active: false,
            execution_period_days: 1,
            request_limit: Some(100),
            topics: vec!["artificial intelligence".to_string()],
            endpoint: Some("https://google-api31.p.rapidapi.com/".to_string()),
            host: Some("google-api31.p.rapidapi.com".to_string()),
            ..Self::default()
        }
    }

    pub fn medium() -> Self {
        Self {
            active: false,
            execution_period_days: 1,
            request_limit: Some(150),
            max_results: 5,
            topics: vec!["artificial intelligence".to_string()],
            endpoint: Some("https://medium2.p.rapidapi.com".to_string()),
            host: Some("medium2.p.rapidapi.com".to_string()),
            ..Self::default()
        }
    }

    pub fn youtube() -> Self {
        Self {
            active: false,
            execution_period_days: 0,
            request_limit: Some(100),
            endpoint: Some("https://youtube-transcript3.p.rapidapi.com/api/transcript-with-url".to_string()),
            host: Some("youtube-transcript3.p.rapidapi.com".to_string()),
            ..Self::default()
        }
    }

    pub fn manual() -> Self {
        Self {
            execution_period_days: 0,
            inbox_dir: dirs::data_dir()
                .map(|p| p.join("pressroom").join("inbox").to_string_lossy().into_owned()),
            ..Self::default()
        }
    }
}

fn default_execution_period() -> u32 {
    7
}

fn default_quota_window() -> u32 {
    30
}

fn default_max_results() -> usize {
    25
}

/// Publications producer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProducerConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Content at least this long goes through the retrieval pipeline first.
    #[serde(default = "default_condensation_threshold")]
    pub condensation_threshold_chars: usize,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of key questions derived from the summary.
    #[serde(default = "default_questions")]
    pub questions: usize,

    #[serde(default = "default_chunks_per_question")]
    pub chunks_per_question: usize,

    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Render `**bold**` spans as Unicode bold in generated posts.
    #[serde(default = "default_true")]
    pub apply_unicode_bold: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            condensation_threshold_chars: default_condensation_threshold(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            questions: default_questions(),
            chunks_per_question: default_chunks_per_question(),
            generation_timeout_secs: default_generation_timeout(),
            apply_unicode_bold: true,
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_condensation_threshold() -> usize {
    6000
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_questions() -> usize {
    5
}

fn default_chunks_per_question() -> usize {
    3
}

fn default_generation_timeout() -> u64 {
    300
}

/// How the per-publication conversation is trimmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimmingStrategy {
    /// Evict oldest turns while the token estimate exceeds `max_tokens`.
    Token,
    /// Keep only the last `max_conversation_length` turns.
    #[default]
    Message,
}

/// Conversation checkpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    #[serde(default)]
    pub trimming_strategy: TrimmingStrategy,

    #[serde(default = "default_conversation_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_conversation_length")]
    pub max_conversation_length: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            trimming_strategy: TrimmingStrategy::default(),
            max_tokens: default_conversation_tokens(),
            max_conversation_length: default_conversation_length(),
        }
    }
}

fn default_conversation_tokens() -> usize {
    8000
}

fn default_conversation_length() -> usize {
    10
}

/// Suggestion controller pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestionsConfig {
    /// Cool-off after a publish before suggestions resume.
    #[serde(default = "default_suggestion_period")]
    pub suggestion_period_days: u32,

    #[serde(default = "default_poll_interval")]
    pub evaluation_interval_secs: u64,

    /// Sleep after finding nothing to suggest.
    #[serde(default = "default_empty_queue_backoff")]
    pub empty_queue_backoff_secs: u64,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            suggestion_period_days: default_suggestion_period(),
            evaluation_interval_secs: default_poll_interval(),
            empty_queue_backoff_secs: default_empty_queue_backoff(),
        }
    }
}

fn default_suggestion_period() -> u32 {
    1
}

fn default_empty_queue_backoff() -> u64 {
    300
}
