// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content sources for Pressroom.
//!
//! Each source variant turns one external origin into [`Draft`]s. The
//! [`SourcesScheduler`] decides when each source runs, enforces request
//! quotas and persists what comes back.
//!
//! [`Draft`]: pressroom_core::Draft

pub mod arxiv;
pub mod filter;
pub mod google_news;
pub mod manual;
pub mod medium;
pub mod rapid;
pub mod scheduler;
pub mod source;
pub mod youtube;

pub use filter::ContentFilter;
pub use scheduler::{CycleReport, SourceOutcome, SourcesScheduler};
pub use source::{Source, classify_reference};
