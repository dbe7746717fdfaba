// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chatlet integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a backend.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock backend with scripted replies and request capture
//! - [`FailingStore`] - Durable store whose writes always fail
//! - [`TestHarness`] - A started widget wired to the mocks

pub mod failing_store;
pub mod harness;
pub mod mock_transport;

pub use failing_store::FailingStore;
pub use harness::{settle, TestHarness, TEST_CUSTOMER};
pub use mock_transport::{MockTransport, Scripted, DEFAULT_REPLY};
