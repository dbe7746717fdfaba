// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity tracking.
//!
//! [`Presence`] holds the widget's online flag. A monitor task follows a
//! `watch` channel and reports transitions to the widget; a
//! [`ConnectivityProbe`] can feed that channel by polling the backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chatlet_core::ChatTransport;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Current connectivity. No intermediate states.
#[derive(Debug)]
pub struct Presence {
    online: AtomicBool,
}

impl Presence {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Stores `online` and returns whether this was a transition.
    pub fn set(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst) != online
    }
}

/// Receives connectivity values from the monitor task.
pub(crate) trait ConnectivityObserver: Send + Sync + 'static {
    fn connectivity_changed(&self, online: bool);
}

/// Follows `rx` until the observer is dropped or the sender closes.
///
/// The current value is assumed to be already applied; only later changes
/// are delivered.
pub(crate) fn spawn_monitor<T: ConnectivityObserver>(
    runtime: &Handle,
    observer: Weak<T>,
    mut rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        while rx.changed().await.is_ok() {
            let online = *rx.borrow_and_update();
            let Some(observer) = observer.upgrade() else {
                break;
            };
            observer.connectivity_changed(online);
        }
        debug!("presence monitor stopped");
    })
}

/// Polls the backend and publishes reachability on a `watch` channel.
pub struct ConnectivityProbe {
    transport: Arc<dyn ChatTransport>,
    interval: Duration,
    tx: watch::Sender<bool>,
}

impl ConnectivityProbe {
    /// Creates a probe and the receiver to hand to the widget.
    ///
    /// The channel starts at `initial` until the first probe completes.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        interval: Duration,
        initial: bool,
    ) -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(initial);
        (
            Self {
                transport,
                interval,
                tx,
            },
            rx,
        )
    }

    /// Another receiver on the same channel.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Runs one health check and publishes the result. Returns reachability.
    pub async fn probe_once(&self) -> bool {
        let online = match self.transport.health_check().await {
            Ok(status) => status.is_reachable(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        };
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        online
    }

    /// Probes immediately, then every `interval`, until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.probe_once().await;
                }
                _ = cancel.cancelled() => {
                    info!("connectivity probe shutting down");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
