// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Pressroom.
//!
//! This crate provides the publication model, the error taxonomy, and the
//! adapter traits through which the orchestrator reaches sources, the
//! generation model, the publishing platform, the operator and the store.

pub mod error;
pub mod format;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PressroomError;
pub use types::{
    AdapterType, Command, CommandReply, CondenseConfig, Condensed, ControllerPhase,
    ControllerState, Draft, DraftOrigin, ExternalPostId, HealthStatus, InboundCommand,
    Publication, PublicationId, PublicationState, PublicationSummary, PublishOutcome,
    RequestBudget, SourceItem, SourceKind, SourceMetadata, SourceScheduleRecord, Turn, TurnRole,
};

pub use traits::{
    GenerationModel, OperatorChannel, PluginAdapter, PublishClient, RetrievalPipeline,
    SourceAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Source,
            AdapterType::Generation,
            AdapterType::Publisher,
            AdapterType::Channel,
            AdapterType::Storage,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }

        let json = serde_json::to_string(&AdapterType::Publisher).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, AdapterType::Publisher);
    }

    #[test]
    fn publication_body_falls_back_to_raw_content() {
        let mut p = Publication {
            id: PublicationId::generate(),
            state: PublicationState::Draft,
            source_metadata: SourceMetadata::new(SourceKind::Manual, "raw text"),
            content: None,
            image: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_updated: "2026-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(p.body(), "raw text");
        p.content = Some("generated".into());
        let summary = p.summary(0, 3);
        assert_eq!(summary.content, "generated");
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin<T: PluginAdapter>() {}
        fn _assert_source<T: SourceAdapter>() {}
        fn _assert_generation<T: GenerationModel>() {}
        fn _assert_publish<T: PublishClient>() {}
        fn _assert_channel<T: OperatorChannel>() {}
        fn _assert_storage<T: StorageAdapter>() {}
        fn _assert_pipeline<T: RetrievalPipeline>() {}
    }
}
