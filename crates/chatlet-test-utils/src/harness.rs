// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for widget-level integration testing.
//!
//! `TestHarness` assembles a [`ChatWidget`] over an in-memory store, a
//! [`MockTransport`] and a connectivity channel the test controls, and
//! subscribes to the widget's events before anything can be published.

use std::sync::Arc;

use chatlet_bus::WidgetEvent;
use chatlet_config::ChatletConfig;
use chatlet_core::{ChatletError, DurableStore, Outcome};
use chatlet_storage::MemoryStore;
use chatlet_widget::ChatWidget;
use tokio::sync::{broadcast, watch};

use crate::mock_transport::MockTransport;

/// Customer id used by harness-built widgets unless overridden.
pub const TEST_CUSTOMER: &str = "c1";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ChatletConfig,
    store: Option<Arc<dyn DurableStore>>,
    transport: Option<Arc<MockTransport>>,
    online: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = ChatletConfig::default();
        config.widget.customer_id = TEST_CUSTOMER.to_string();
        config.widget.api_url = "http://backend.test/api".to_string();
        Self {
            config,
            store: None,
            transport: None,
            online: true,
        }
    }

    /// Adjust the widget configuration.
    pub fn with_config(mut self, configure: impl FnOnce(&mut ChatletConfig)) -> Self {
        configure(&mut self.config);
        self
    }

    /// Use an existing durable store (e.g. to simulate a page reload).
    pub fn with_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use an existing mock transport.
    pub fn with_transport(mut self, transport: Arc<MockTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set successful chat replies for the mock transport.
    pub fn with_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transport = Some(Arc::new(MockTransport::with_replies(replies)));
        self
    }

    /// Start the widget offline.
    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    /// Build the harness. Must be called inside a Tokio runtime.
    pub fn build(self) -> Result<TestHarness, ChatletError> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn DurableStore>);
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(MockTransport::new()));
        let (connectivity, rx) = watch::channel(self.online);

        let widget = ChatWidget::start(&self.config, store.clone(), transport.clone(), rx)?;
        let events = widget.subscribe();

        Ok(TestHarness {
            widget,
            transport,
            store,
            connectivity,
            events,
            config: self.config,
        })
    }
}

/// A running widget wired to mocks.
pub struct TestHarness {
    pub widget: ChatWidget,
    pub transport: Arc<MockTransport>,
    pub store: Arc<dyn DurableStore>,
    pub config: ChatletConfig,
    connectivity: watch::Sender<bool>,
    events: broadcast::Receiver<WidgetEvent>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message through the widget.
    pub async fn send_message(&self, text: &str) -> Outcome {
        self.widget.send_message(text).await
    }

    /// Flip the simulated connectivity and let the widget observe it.
    pub async fn set_online(&self, online: bool) {
        self.connectivity.send_replace(online);
        settle().await;
    }

    /// Whether the widget's monitor has stopped listening.
    pub fn connectivity_closed(&self) -> bool {
        self.connectivity.is_closed()
    }

    /// Drop the widget and report whether its monitor released the
    /// connectivity channel.
    pub async fn shutdown(self) -> bool {
        let TestHarness {
            widget,
            connectivity,
            ..
        } = self;
        drop(widget);
        settle().await;
        connectivity.is_closed()
    }

    /// Every event published since the last drain.
    pub fn drain_events(&mut self) -> Vec<WidgetEvent> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "test harness lagged behind widget events");
                }
                Err(_) => break,
            }
        }
        events
    }

    /// Start a second widget over the same store and transport, as after a reload.
    pub fn reload(&self) -> Result<TestHarness, ChatletError> {
        TestHarness::builder()
            .with_config(|config| *config = self.config.clone())
            .with_store(self.store.clone())
            .with_transport(self.transport.clone())
            .build()
    }
}

/// Yield enough times for spawned widget tasks to run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlet_core::MessageKind;

    #[tokio::test]
    async fn builder_defaults_are_online_with_empty_history() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.widget.is_online());
        assert!(harness.widget.history().is_empty());
        assert_eq!(harness.widget.customer_id().as_str(), TEST_CUSTOMER);
    }

    #[tokio::test]
    async fn send_message_uses_scripted_reply() {
        let harness = TestHarness::builder()
            .with_replies(["custom response"])
            .build()
            .unwrap();

        let outcome = harness.send_message("hello").await;
        assert!(outcome.is_delivered());
        let history = harness.widget.history();
        assert_eq!(history[1].kind, MessageKind::Bot);
        assert_eq!(history[1].text, "custom response");
    }

    #[tokio::test]
    async fn reload_restores_history() {
        let harness = TestHarness::builder().build().unwrap();
        harness.send_message("persist me").await;

        let reloaded = harness.reload().unwrap();
        assert_eq!(reloaded.widget.history(), harness.widget.history());
    }

    #[tokio::test]
    async fn harnesses_do_not_share_state() {
        let h1 = TestHarness::builder().build().unwrap();
        let h2 = TestHarness::builder().build().unwrap();
        h1.send_message("only in h1").await;
        assert_eq!(h1.widget.history().len(), 2);
        assert!(h2.widget.history().is_empty());
    }
}
