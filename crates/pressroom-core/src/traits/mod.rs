// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Every external collaborator sits behind one of these traits. Adapters with
//! an identity and lifecycle extend [`PluginAdapter`]; all use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod generation;
pub mod pipeline;
pub mod publish;
pub mod source;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::OperatorChannel;
pub use generation::GenerationModel;
pub use pipeline::RetrievalPipeline;
pub use publish::PublishClient;
pub use source::SourceAdapter;
pub use storage::StorageAdapter;
