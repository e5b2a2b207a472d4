// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Pressroom integration tests.
//!
//! Mock adapters and a harness for fast, deterministic tests without
//! external services.
//!
//! - [`MockChannel`]: operator channel with injectable commands
//! - [`MockGeneration`]: generation model with scripted replies
//! - [`MockPublisher`]: publishing client with scripted outcomes
//! - [`MockSource`]: source adapter with canned drafts
//! - [`TestHarness`]: producer, controller and workflow over temp storage

pub mod harness;
pub mod mock_channel;
pub mod mock_generation;
pub mod mock_publisher;
pub mod mock_source;

pub use harness::{OPERATOR, TestHarness, temp_storage};
pub use mock_channel::MockChannel;
pub use mock_generation::{GenerationCall, MockGeneration, MockResponse};
pub use mock_publisher::{MockPublish, MockPublisher};
pub use mock_source::MockSource;
