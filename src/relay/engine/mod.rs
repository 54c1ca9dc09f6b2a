mod trait_message_handler;
mod new;
mod on_sensor_reading;
mod on_classification;
mod end_session;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::relay::{
    broadcaster::Broadcaster,
    export::SessionExporter,
    history::SessionHistory,
    last_values::LastValueTable,
    persistence::PersistenceQueue,
    session::SessionTracker,
    state_cache::DeviceStateCache,
    topic::TopicMap,
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Ingestion core: routes each inbound message, keeps live state, gates
/// persistence on code changes and relays everything to live subscribers.
///
/// One instance owns all of its state, so several relays can run side by side.
pub struct Relay {
    topics: TopicMap,
    cache: DeviceStateCache,
    last_values: LastValueTable,
    session: SessionTracker,
    history: SessionHistory,
    broadcaster: Arc<dyn Broadcaster>,
    persistence: PersistenceQueue,
    exporter: Option<Arc<dyn SessionExporter>>,
    reset_change_gate_on_session_end: bool,
    connected: bool,
    clock: Clock,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("topics", &self.topics)
            .field("session", &self.session)
            .field("connected", &self.connected)
            .field("broadcaster", &"<dyn Broadcaster>")
            .field("exporter", &self.exporter.as_ref().map(|_| "<dyn SessionExporter>"))
            .finish()
    }
}
