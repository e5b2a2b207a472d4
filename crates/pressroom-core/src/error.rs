// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the publication lifecycle.

use thiserror::Error;

use crate::types::{PublicationState, SourceKind};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Pressroom adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PressroomError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage { source: BoxedSource },

    /// A source adapter failed: network, non-2xx response, quota or parse error.
    /// Retried on the next scheduled cycle.
    #[error("source {kind} failed: {message}")]
    TransientSource {
        kind: SourceKind,
        message: String,
        source: Option<BoxedSource>,
    },

    /// A source has used up its request quota for the current window.
    #[error("source {kind} reached its request limit of {limit}")]
    QuotaExhausted { kind: SourceKind, limit: u32 },

    /// The generation model failed or timed out. The publication stays a draft.
    #[error("generation failed: {message}")]
    TransientGeneration {
        message: String,
        source: Option<BoxedSource>,
    },

    /// A state transition was attempted from the wrong state.
    #[error("publication {publication_id} is {actual}, expected {expected}")]
    PreconditionFailed {
        publication_id: String,
        expected: PublicationState,
        actual: PublicationState,
    },

    /// No publication with this id exists.
    #[error("publication not found: {0}")]
    PublicationNotFound(String),

    /// The publishing credential is missing or expired.
    #[error("re-authentication required: {auth_url}")]
    ReauthRequired { auth_url: String },

    /// The publishing platform rejected or failed the post.
    #[error("publish failed: {message}")]
    Publish {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The operator channel could not deliver a suggestion.
    #[error("delivery failed: {message}")]
    DeliveryFailure {
        message: String,
        source: Option<BoxedSource>,
    },

    /// A command arrived from someone other than the bound operator.
    #[error("sender {sender} is not the bound operator")]
    IdentityMismatch { sender: String },

    /// Operator channel transport errors outside of suggestion delivery.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<BoxedSource>,
    },

    /// A command was malformed or referred to something that does not exist.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PressroomError {
    /// Whether the failure is expected to clear up on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransientSource { .. }
                | Self::QuotaExhausted { .. }
                | Self::TransientGeneration { .. }
                | Self::DeliveryFailure { .. }
                | Self::Channel { .. }
                | Self::Timeout { .. }
        )
    }

    /// Stable short code surfaced in command replies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Storage { .. } => "storage",
            Self::TransientSource { .. } => "source_unavailable",
            Self::QuotaExhausted { .. } => "quota_exhausted",
            Self::TransientGeneration { .. } => "generation_failed",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::PublicationNotFound(_) => "not_found",
            Self::ReauthRequired { .. } => "reauth_required",
            Self::Publish { .. } => "publish_failed",
            Self::DeliveryFailure { .. } => "delivery_failed",
            Self::IdentityMismatch { .. } => "identity_mismatch",
            Self::Channel { .. } => "channel",
            Self::InvalidCommand(_) => "invalid_command",
            Self::Timeout { .. } => "timeout",
            Self::Internal(_) => "internal",
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::TransientGeneration {
            message: message.into(),
            source: None,
        }
    }

    pub fn source_failure(kind: SourceKind, message: impl Into<String>) -> Self {
        Self::TransientSource {
            kind,
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failed_names_both_states() {
        let err = PressroomError::PreconditionFailed {
            publication_id: "abc".into(),
            expected: PublicationState::PendingApproval,
            actual: PublicationState::Draft,
        };
        let msg = err.to_string();
        assert!(msg.contains("DRAFT"));
        assert!(msg.contains("PENDING_APPROVAL"));
        assert_eq!(err.code(), "precondition_failed");
        assert!(!err.is_transient());
    }

    #[test]
    fn source_and_generation_failures_are_transient() {
        assert!(PressroomError::source_failure(SourceKind::Arxiv, "503").is_transient());
        assert!(PressroomError::generation("overloaded").is_transient());
        assert!(
            PressroomError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_transient()
        );
        assert!(!PressroomError::IdentityMismatch { sender: "x".into() }.is_transient());
    }
}
