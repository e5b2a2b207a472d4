// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication lifecycle loops for Pressroom.
//!
//! - [`PublicationsProducer`] turns drafts into posts awaiting approval.
//! - [`SuggestionController`] delivers suggestions to the operator and
//!   executes their commands over the [`ApprovalQueue`].
//! - [`PublishWorkflow`] performs the terminal transitions.
//! - [`DefaultRetrievalPipeline`] condenses long content before generation.

pub mod controller;
pub mod pipeline;
pub mod producer;
pub mod publish;
pub mod queue;
pub mod shutdown;

pub use controller::{ControllerSettings, Evaluation, SuggestionController};
pub use pipeline::DefaultRetrievalPipeline;
pub use producer::{ProducerReport, PublicationsProducer};
pub use publish::PublishWorkflow;
pub use queue::ApprovalQueue;
pub use shutdown::install_signal_handler;
