use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::relay::broadcaster::{session_status, Broadcaster, SESSION_STATUS_EVENT};
use crate::relay::state_cache::LiveCacheReader;

#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    pub name: String,
    pub payload: Value,
}

impl LiveEvent {
    pub fn new(name: &str, payload: Value) -> Self {
        Self {
            name: name.to_string(),
            payload,
        }
    }
}

pub type LiveReceiver = mpsc::UnboundedReceiver<LiveEvent>;
pub type LiveSender = mpsc::UnboundedSender<LiveEvent>;

/// In-process fan-out to live subscribers.
///
/// Each subscriber owns an unbounded channel, so events reach every
/// subscriber in publish order. There is no backlog: a subscriber only sees
/// what is published after it subscribed, plus one synthesized session status.
#[derive(Debug, Clone)]
pub struct LiveBus {
    // Arc<Mutex> so the bus can be cloned into several tasks
    subscribers: Arc<Mutex<Vec<LiveSender>>>,
    cache: LiveCacheReader,
}

impl LiveBus {
    pub fn new(cache: LiveCacheReader) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            cache,
        }
    }

    pub fn subscribe(&self) -> LiveReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();

        // Hold the lock while reading the status so no publish slips between
        // the synthesized event and registration.
        let mut subscribers = self.lock();
        let status = session_status(self.cache.session_started_at());
        let _ = sender.send(LiveEvent::new(SESSION_STATUS_EVENT, status));
        subscribers.push(sender);

        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver to every open subscriber, dropping closed ones. Returns how
    /// many subscribers received the event.
    pub fn publish(&self, event: LiveEvent) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LiveSender>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Broadcaster for LiveBus {
    fn emit(&self, event_name: &str, payload: Value) {
        let delivered = self.publish(LiveEvent::new(event_name, payload));
        debug!(event = event_name, delivered, "live event published");
    }
}
