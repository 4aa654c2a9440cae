// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity oracle.
//!
//! Reports whether the client believes it is online and broadcasts one event
//! per online/offline transition. The signal is best effort: being "online"
//! does not mean the API host answers, and remote failures are still handled
//! by the sync manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::remote::Endpoint;

/// Buffered transitions per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 16;

/// A connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Source of online/offline state and transition events.
pub trait Connectivity: Send + Sync {
    /// Last reported state. Never blocks.
    fn is_online(&self) -> bool;

    /// Receive every transition that happens after this call.
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}

/// Connectivity state fed by [`NetworkMonitor::set_online`] or a probe task.
pub struct NetworkMonitor {
    online: AtomicBool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        NetworkMonitor {
            online: AtomicBool::new(initially_online),
            events,
        }
    }

    /// Record the platform-reported state.
    ///
    /// Emits an event and returns true only when the state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }

        let event = if online {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        };
        tracing::debug!(?event, "connectivity changed");
        // No subscribers is fine
        let _ = self.events.send(event);
        true
    }

    /// Check once whether a TCP connection to `endpoint` opens within `timeout`.
    pub async fn probe(endpoint: &Endpoint, timeout: Duration) -> bool {
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        matches!(tokio::time::timeout(timeout, connect).await, Ok(Ok(_)))
    }

    /// Probe `endpoint` every `interval` and report the result.
    ///
    /// The task runs until aborted through the returned handle.
    pub fn spawn_probe(
        self: &Arc<Self>,
        endpoint: Endpoint,
        interval: Duration,
        timeout: Duration,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let online = NetworkMonitor::probe(&endpoint, timeout).await;
                monitor.set_online(online);
            }
        })
    }
}

impl Connectivity for NetworkMonitor {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
