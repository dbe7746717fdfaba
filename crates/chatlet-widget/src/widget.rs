// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat widget instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chatlet_bus::{EventBus, WidgetEvent};
use chatlet_config::model::{NoticeConfig, ThemeConfig, ThemeOverrides, WidgetPosition};
use chatlet_config::ChatletConfig;
use chatlet_core::{
    ChatRequest, ChatTransport, ChatletError, CustomerId, DurableStore, FailureKind, FileUpload,
    IndicatorId, Message, Outcome,
};
use chatlet_storage::SessionStore;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::indicator::IndicatorTracker;
use crate::presence::{self, ConnectivityObserver, Presence};
use crate::typing::{TypingDebouncer, TypingState, TYPING_IDLE_TIMEOUT};
use crate::upload::{image_markdown, UploadPolicy, UploadViolation};

/// Number of most recent messages sent as context with each chat request.
pub const CONTEXT_WINDOW: usize = 5;

/// One embedded chat widget bound to one customer.
///
/// All user-facing failures end up in the conversation as `error` messages;
/// the returned [`Outcome`] only reports what happened.
pub struct ChatWidget {
    core: Arc<WidgetCore>,
    monitor: JoinHandle<()>,
}

struct WidgetCore {
    customer: CustomerId,
    title: String,
    position: WidgetPosition,
    welcome_message: String,
    notices: NoticeConfig,
    upload: UploadPolicy,
    theme: Mutex<ThemeConfig>,
    open: AtomicBool,
    session: SessionStore,
    transport: Arc<dyn ChatTransport>,
    bus: EventBus,
    presence: Presence,
    indicators: Arc<IndicatorTracker>,
    typing: TypingDebouncer,
}

impl ChatWidget {
    /// Builds a widget and starts its background tasks on the current Tokio runtime.
    ///
    /// History and draft are loaded from `store`; the initial connectivity is
    /// the current value of `connectivity`.
    pub fn start(
        config: &ChatletConfig,
        store: Arc<dyn DurableStore>,
        transport: Arc<dyn ChatTransport>,
        mut connectivity: watch::Receiver<bool>,
    ) -> Result<Self, ChatletError> {
        let runtime = Handle::try_current().map_err(|e| {
            ChatletError::Internal(format!("chat widget must start inside a Tokio runtime: {e}"))
        })?;

        let customer_id = config.widget.customer_id.trim();
        if customer_id.is_empty() {
            return Err(ChatletError::Config(
                "widget.customer_id must not be empty".to_string(),
            ));
        }
        let customer = CustomerId::from(customer_id);

        let bus = EventBus::default();
        let online = *connectivity.borrow_and_update();
        let session = SessionStore::open(store, customer.clone());
        let typing = TypingDebouncer::new(transport.clone(), TYPING_IDLE_TIMEOUT, &runtime);

        let core = Arc::new(WidgetCore {
            customer,
            title: config.widget.title.clone(),
            position: config.widget.position,
            welcome_message: config.widget.welcome_message.clone(),
            notices: config.notices.clone(),
            upload: UploadPolicy::from_config(&config.upload),
            theme: Mutex::new(config.theme.clone()),
            open: AtomicBool::new(false),
            session,
            transport,
            indicators: Arc::new(IndicatorTracker::new(bus.clone())),
            bus,
            presence: Presence::new(online),
            typing,
        });
        let monitor = presence::spawn_monitor(&runtime, Arc::downgrade(&core), connectivity);

        info!(
            customer = %core.customer,
            online,
            messages = core.session.len(),
            transport = core.transport.name(),
            "chat widget started"
        );
        Ok(Self { core, monitor })
    }

    /// Sends one user message to the backend.
    ///
    /// Offline: appends the offline notice and makes no request. Online:
    /// appends the user message, shows an indicator for the duration of the
    /// request, then appends the bot reply or the send-failed notice.
    pub async fn send_message(&self, text: &str) -> Outcome {
        let core = &self.core;
        core.typing.on_message_sent();

        if !core.presence.is_online() {
            debug!("send skipped while offline");
            return core.fail(FailureKind::Offline, &core.notices.offline);
        }

        core.append(Message::user(text));
        let request = ChatRequest {
            text: text.to_string(),
            history: core.session.recent(CONTEXT_WINDOW),
        };

        let indicator = core.indicators.show();
        let result = core.transport.send_chat(&request).await;
        indicator.dismiss();

        match result {
            Ok(reply) => {
                let message = Message::bot(reply.message);
                core.append(message.clone());
                Outcome::Delivered(message)
            }
            Err(e) => {
                let kind = e.failure_kind();
                warn!(error = %e, kind = %kind, "chat request failed");
                core.fail(kind, &core.notices.send_failed)
            }
        }
    }

    /// Reports typing status directly. Failures are logged, never retried.
    pub async fn send_typing_status(&self, is_typing: bool) {
        if let Err(e) = self.core.transport.send_typing(is_typing).await {
            warn!(is_typing, error = %e, "failed to send typing status");
        }
    }

    /// Validates and uploads a file.
    ///
    /// On success the conversation gains a `user` message linking the image.
    pub async fn upload_file(&self, file: FileUpload) -> Outcome {
        let core = &self.core;

        if let Err(violation) = core.upload.check(&file) {
            info!(file = %file.name, %violation, "upload rejected");
            let notice = match violation {
                UploadViolation::UnsupportedType { .. } => &core.notices.unsupported_file_type,
                UploadViolation::TooLarge { .. } => &core.notices.file_too_large,
            };
            return core.fail(FailureKind::Validation, notice);
        }

        match core.transport.upload(&file).await {
            Ok(reply) => {
                let message = Message::user(image_markdown(&file.name, &reply.url));
                core.append(message.clone());
                Outcome::Delivered(message)
            }
            Err(e) => {
                let kind = e.failure_kind();
                warn!(file = %file.name, error = %e, kind = %kind, "upload failed");
                core.fail(kind, &core.notices.upload_failed)
            }
        }
    }

    /// Records an edit of the input field: saves the draft and feeds the
    /// typing debounce.
    pub fn input(&self, text: &str) {
        self.core.session.save_draft(text);
        self.core.typing.on_input();
    }

    /// Sends the current draft, trimmed, and clears it.
    ///
    /// Returns `None` when the draft is blank; the draft is cleared either way.
    pub async fn submit(&self) -> Option<Outcome> {
        let draft = self.core.session.draft();
        self.core.session.save_draft("");
        let text = draft.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.send_message(text).await)
    }

    /// Opens or closes the chat window. Returns the new state.
    pub fn toggle(&self) -> bool {
        let open = !self.core.open.fetch_xor(true, Ordering::SeqCst);
        debug!(open, "visibility toggled");
        self.core.bus.publish(WidgetEvent::VisibilityChanged { open });
        open
    }

    pub fn is_open(&self) -> bool {
        self.core.open.load(Ordering::SeqCst)
    }

    pub fn theme(&self) -> ThemeConfig {
        self.core
            .theme
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merges partial theme overrides and notifies subscribers.
    pub fn update_theme(&self, overrides: ThemeOverrides) {
        self.core
            .theme
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(overrides);
        self.core.bus.publish(WidgetEvent::ThemeChanged);
    }

    pub fn title(&self) -> &str {
        &self.core.title
    }

    pub fn position(&self) -> WidgetPosition {
        self.core.position
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.core.customer
    }

    pub fn is_online(&self) -> bool {
        self.core.presence.is_online()
    }

    /// Full in-memory history of this session, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.core.session.history()
    }

    /// What a rendering surface should show: the history, or the welcome
    /// message when there is none yet.
    pub fn transcript(&self) -> Vec<Message> {
        let history = self.core.session.history();
        if history.is_empty() && !self.core.welcome_message.is_empty() {
            vec![Message::bot(self.core.welcome_message.as_str())]
        } else {
            history
        }
    }

    pub fn draft(&self) -> String {
        self.core.session.draft()
    }

    pub fn active_indicators(&self) -> Vec<IndicatorId> {
        self.core.indicators.active()
    }

    pub fn typing_state(&self) -> TypingState {
        self.core.typing.state()
    }

    /// Subscribes to widget events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.core.bus.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.core.bus
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

impl WidgetCore {
    fn append(&self, message: Message) {
        self.session.append(message.clone());
        self.bus.publish(WidgetEvent::MessageAppended { message });
    }

    fn fail(&self, kind: FailureKind, notice: &str) -> Outcome {
        let notice = Message::error(notice);
        self.append(notice.clone());
        Outcome::Failed { kind, notice }
    }
}

impl ConnectivityObserver for WidgetCore {
    fn connectivity_changed(&self, online: bool) {
        if !self.presence.set(online) {
            return;
        }
        info!(online, "connectivity changed");
        self.bus.publish(WidgetEvent::ConnectivityChanged { online });
        if !online {
            self.append(Message::error(self.notices.connection_lost.as_str()));
        }
    }
}
