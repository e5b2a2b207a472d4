// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication model and the common types shared by adapters and loops.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier of a publication. Doubles as the conversation thread key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicationId(pub String);

impl PublicationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PublicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state of a publication.
///
/// Valid transitions are `DRAFT -> PENDING_APPROVAL` and
/// `PENDING_APPROVAL -> PUBLISHED | DISCARDED`. The last two are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationState {
    Draft,
    PendingApproval,
    Published,
    Discarded,
}

impl PublicationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Discarded)
    }

    pub fn can_transition_to(self, next: PublicationState) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::PendingApproval)
                | (Self::PendingApproval, Self::Published)
                | (Self::PendingApproval, Self::Discarded)
        )
    }
}

/// The closed set of content sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Arxiv,
    GoogleNews,
    Medium,
    Youtube,
    Manual,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Arxiv,
        SourceKind::GoogleNews,
        SourceKind::Medium,
        SourceKind::Youtube,
        SourceKind::Manual,
    ];
}

/// What a source adapter knows about the item it scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub raw_content: String,
    pub source_type: SourceKind,
    pub link: Option<String>,
}

impl SourceMetadata {
    pub fn new(source_type: SourceKind, raw_content: impl Into<String>) -> Self {
        Self {
            title: None,
            author: None,
            created_at: None,
            description: None,
            raw_content: raw_content.into(),
            source_type,
            link: None,
        }
    }
}

/// Operator input a draft was built from. It is released only after the
/// draft has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOrigin {
    /// Row id in the source item pool.
    PoolItem(i64),
    /// File picked up from an inbox directory.
    InboxFile(PathBuf),
}

/// A candidate returned by a source adapter, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub metadata: SourceMetadata,
    pub image: Option<Vec<u8>>,
    pub origin: Option<DraftOrigin>,
}

impl Draft {
    pub fn new(metadata: SourceMetadata) -> Self {
        Self {
            metadata,
            image: None,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: DraftOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn pool_item(&self) -> Option<i64> {
        match self.origin {
            Some(DraftOrigin::PoolItem(id)) => Some(id),
            _ => None,
        }
    }
}

/// A persisted publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub id: PublicationId,
    pub state: PublicationState,
    pub source_metadata: SourceMetadata,
    /// Generated post body; `None` until the producer fills it.
    pub content: Option<String>,
    pub image: Option<Vec<u8>>,
    pub created_at: String,
    pub last_updated: String,
}

impl Publication {
    /// Post body shown to the operator, falling back to the raw content.
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .unwrap_or(&self.source_metadata.raw_content)
    }

    pub fn summary(&self, position: usize, total: usize) -> PublicationSummary {
        PublicationSummary {
            id: self.id.clone(),
            position,
            total,
            title: self.source_metadata.title.clone(),
            content: self.body().to_string(),
            source_type: self.source_metadata.source_type,
            link: self.source_metadata.link.clone(),
            image: self.image.clone(),
        }
    }
}

/// The view of a queued publication delivered to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationSummary {
    pub id: PublicationId,
    /// Zero-based position in the approval queue.
    pub position: usize,
    pub total: usize,
    pub title: Option<String>,
    pub content: String,
    pub source_type: SourceKind,
    pub link: Option<String>,
    pub image: Option<Vec<u8>>,
}

/// Per-source schedule and rate limit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScheduleRecord {
    pub source: SourceKind,
    pub last_run_time: Option<DateTime<Utc>>,
    pub execution_period_days: u32,
    pub active: bool,
    pub request_count: u32,
    /// Maximum requests per quota window. `None` means unlimited.
    pub request_limit: Option<u32>,
    pub quota_window_days: u32,
    pub count_reset_time: Option<DateTime<Utc>>,
}

impl SourceScheduleRecord {
    pub fn new(source: SourceKind, execution_period_days: u32) -> Self {
        Self {
            source,
            last_run_time: None,
            execution_period_days,
            active: true,
            request_count: 0,
            request_limit: None,
            quota_window_days: 30,
            count_reset_time: None,
        }
    }

    fn period(&self) -> Duration {
        Duration::days(i64::from(self.execution_period_days))
    }

    /// A source that never ran is due immediately.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self
                .last_run_time
                .is_none_or(|last| now - last >= self.period())
    }

    /// When this source next becomes due, or `None` if it is due now.
    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_time.map(|last| last + self.period())
    }

    /// Reset the request counter once the quota window has elapsed.
    pub fn roll_quota_window(&mut self, now: DateTime<Utc>) {
        if self.count_reset_time.is_none_or(|reset| now >= reset) {
            self.request_count = 0;
            self.count_reset_time =
                Some(now + Duration::days(i64::from(self.quota_window_days.max(1))));
        }
    }

    pub fn quota_exhausted(&self) -> bool {
        self.request_limit
            .is_some_and(|limit| self.request_count >= limit)
    }

    /// When the scheduler should look at this source again. While the quota
    /// is used up that is no earlier than the quota reset.
    pub fn next_attempt_at(&self) -> Option<DateTime<Utc>> {
        let due = self.next_due_at();
        match (self.quota_exhausted(), self.count_reset_time) {
            (true, Some(reset)) => Some(due.map_or(reset, |d| d.max(reset))),
            _ => due,
        }
    }
}

/// Requests a source run may send, shared by the scheduler and the adapter.
///
/// Adapters take a slot before every call that counts against the external
/// quota; the scheduler writes [`RequestBudget::used`] back to the schedule
/// record even when the run fails or times out.
#[derive(Debug)]
pub struct RequestBudget {
    source: SourceKind,
    used: AtomicU32,
    limit: Option<u32>,
}

impl RequestBudget {
    pub fn new(source: SourceKind, used: u32, limit: Option<u32>) -> Self {
        Self {
            source,
            used: AtomicU32::new(used),
            limit,
        }
    }

    pub fn for_record(record: &SourceScheduleRecord) -> Self {
        Self::new(record.source, record.request_count, record.request_limit)
    }

    pub fn unlimited(source: SourceKind) -> Self {
        Self::new(source, 0, None)
    }

    /// Take one request slot, or fail with `QuotaExhausted` without counting.
    pub fn acquire(&self) -> Result<(), crate::PressroomError> {
        let limit = self.limit;
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| match limit {
                Some(limit) if used >= limit => None,
                _ => Some(used.saturating_add(1)),
            })
            .map(|_| ())
            .map_err(|used| crate::PressroomError::QuotaExhausted {
                kind: self.source,
                limit: limit.unwrap_or(used),
            })
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }
}

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    System,
    Operator,
    Agent,
}

/// One entry of a publication's editing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub attachment: Option<String>,
    pub token_estimate: usize,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_estimate = crate::format::estimate_tokens(&content);
        Self {
            role,
            content,
            attachment: None,
            token_estimate,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    pub fn operator(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Operator, content)
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Agent, content)
    }

    pub fn with_attachment(mut self, reference: impl Into<String>) -> Self {
        self.attachment = Some(reference.into());
        self
    }

    pub fn is_system(&self) -> bool {
        self.role == TurnRole::System
    }
}

/// Phase of the suggestion controller state machine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerPhase {
    #[default]
    Idle,
    AwaitingInteraction,
    CoolingOff,
}

/// The single persisted row of operator-facing state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Bound by the first `start` command, immutable afterwards.
    pub operator_identity: Option<String>,
    pub phase: ControllerPhase,
    pub suggestions_blocked: bool,
    /// Set by `stop`, cleared by `allow`; keeps suggestions blocked after a cool-off ends.
    pub operator_paused: bool,
    /// Set when delivery to the operator failed; cleared only by `allow`.
    pub delivery_failed: bool,
    /// Last publication shown, used to resync the queue pointer.
    pub current_publication: Option<PublicationId>,
    pub last_published_at: Option<DateTime<Utc>>,
    pub cool_off_until: Option<DateTime<Utc>>,
}

impl ControllerState {
    pub fn is_cooling_off(&self, now: DateTime<Utc>) -> bool {
        self.cool_off_until.is_some_and(|until| now < until)
    }
}

/// Operator commands accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Next,
    Previous,
    Select(usize),
    List,
    Current,
    Publish,
    Discard,
    Allow,
    Stop,
    /// Replace the current post body verbatim.
    Update(String),
    /// Ask the model to revise the current post.
    Revise(String),
    AddSourceItem(String),
    SetImage(Vec<u8>),
    ClearImage,
    Health,
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Select(_) => "select",
            Self::List => "list",
            Self::Current => "current",
            Self::Publish => "publish",
            Self::Discard => "discard",
            Self::Allow => "allow",
            Self::Stop => "stop",
            Self::Update(_) => "update",
            Self::Revise(_) => "revise",
            Self::AddSourceItem(_) => "add_source_item",
            Self::SetImage(_) => "set_image",
            Self::ClearImage => "clear_image",
            Self::Health => "health",
        }
    }
}

/// A command together with the identity that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub sender: String,
    pub command: Command,
}

/// Result of a command, rendered by the operator channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Summary(PublicationSummary),
    List(Vec<(usize, String)>),
    Text(String),
    Error { code: String, message: String },
}

impl CommandReply {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    pub fn from_error(err: &crate::PressroomError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Post identifier returned by the publishing platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalPostId(pub String);

/// Outcome of a publish attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(ExternalPostId),
    NeedsReauth { auth_url: String },
}

/// Parameters for condensing long content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondenseConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub questions: usize,
    pub chunks_per_question: usize,
    /// Skip title inference when the source already supplied one.
    pub known_title: Option<String>,
}

impl Default for CondenseConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            questions: 5,
            chunks_per_question: 3,
            known_title: None,
        }
    }
}

/// Output of the retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condensed {
    pub dialog: String,
    pub title: Option<String>,
}

/// A queued reference waiting for its source adapter (a video URL, a document path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub id: i64,
    pub source: SourceKind,
    pub reference: String,
    pub added_at: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    Generation,
    Publisher,
    Channel,
    Storage,
}
