// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content length filters applied before a candidate becomes a draft.

use pressroom_config::model::SourcesConfig;
use pressroom_core::Draft;
use tracing::{debug, warn};

/// Drops short paragraphs and candidates that are too short to post about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFilter {
    /// Candidates must be strictly longer than this, in characters.
    pub minimum_content_length: usize,
    /// Paragraphs must be strictly longer than this, in characters.
    pub paragraph_min_length: usize,
}

impl From<&SourcesConfig> for ContentFilter {
    fn from(config: &SourcesConfig) -> Self {
        Self {
            minimum_content_length: config.minimum_content_length,
            paragraph_min_length: config.paragraph_min_length,
        }
    }
}

impl ContentFilter {
    /// Remove paragraphs (blank-line separated) at or below the paragraph minimum.
    pub fn clean(&self, text: &str) -> String {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| p.chars().count() > self.paragraph_min_length)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn accepts(&self, content: &str) -> bool {
        content.chars().count() > self.minimum_content_length
    }

    /// Clean every draft and keep those still long enough.
    pub fn apply(&self, drafts: Vec<Draft>) -> Vec<Draft> {
        let before = drafts.len();
        let kept: Vec<Draft> = drafts
            .into_iter()
            .filter_map(|mut draft| {
                draft.metadata.raw_content = self.clean(&draft.metadata.raw_content);
                if self.accepts(&draft.metadata.raw_content) {
                    return Some(draft);
                }
                if let Some(origin) = &draft.origin {
                    warn!(?origin, title = ?draft.metadata.title, "operator input too short, released without a draft");
                }
                None
            })
            .collect();
        if kept.len() < before {
            debug!(dropped = before - kept.len(), kept = kept.len(), "content filter applied");
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_core::{SourceKind, SourceMetadata};

    fn filter() -> ContentFilter {
        ContentFilter {
            minimum_content_length: 20,
            paragraph_min_length: 5,
        }
    }

    #[test]
    fn short_paragraphs_are_dropped() {
        let text = "Intro paragraph here.\n\nok\n\n  Another real paragraph.  ";
        assert_eq!(
            filter().clean(text),
            "Intro paragraph here.\n\nAnother real paragraph."
        );
    }

    #[test]
    fn paragraph_at_the_limit_is_dropped() {
        assert_eq!(filter().clean("12345\n\n123456"), "123456");
    }

    #[test]
    fn minimum_length_is_strict() {
        let f = filter();
        assert!(!f.accepts(&"x".repeat(20)));
        assert!(f.accepts(&"x".repeat(21)));
    }

    #[test]
    fn apply_keeps_only_long_enough_drafts() {
        let long = Draft::new(SourceMetadata::new(
            SourceKind::Arxiv,
            "A paragraph that is comfortably long.",
        ));
        let short = Draft::new(SourceMetadata::new(SourceKind::Arxiv, "tiny\n\nbits"));
        let kept = filter().apply(vec![long.clone(), short]);
        assert_eq!(kept, vec![long]);
    }
}
