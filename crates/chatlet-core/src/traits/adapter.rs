// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by network-facing adapters.

use async_trait::async_trait;

use crate::error::ChatletError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for Chatlet adapters.
///
/// Provides identity and a reachability check. The presence probe relies on
/// [`PluginAdapter::health_check`] to decide whether the widget is online.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the type of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ChatletError>;
}
