use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::relay::{
    broadcaster::Broadcaster,
    export::SessionExporter,
    history::SessionHistory,
    last_values::LastValueTable,
    persistence::PersistenceQueue,
    session::{SessionState, SessionTracker},
    state_cache::{DeviceStateCache, LiveCacheReader, LiveCacheView},
    topic::TopicMap,
};

use super::{Clock, Relay};

impl Relay {
    pub fn new(
        topics: TopicMap,
        cache: DeviceStateCache,
        broadcaster: Arc<dyn Broadcaster>,
        persistence: PersistenceQueue,
    ) -> Self {
        Self {
            topics,
            cache,
            last_values: LastValueTable::new(),
            session: SessionTracker::new(),
            history: SessionHistory::default(),
            broadcaster,
            persistence,
            exporter: None,
            reset_change_gate_on_session_end: false,
            connected: false,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn SessionExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = SessionHistory::new(limit);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Forget last-seen codes whenever a session ends, so the first
    /// classification of every session is persisted.
    pub fn reset_change_gate_on_session_end(mut self, reset: bool) -> Self {
        self.reset_change_gate_on_session_end = reset;
        self
    }

    pub fn reader(&self) -> LiveCacheReader {
        self.cache.reader()
    }

    pub fn snapshot(&self) -> LiveCacheView {
        self.cache.snapshot()
    }

    pub fn last_values(&self) -> LastValueTable {
        self.last_values.clone()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn topics(&self) -> &TopicMap {
        &self.topics
    }

    /// Buffered (sensor readings, classifications) for the running session.
    pub fn history_len(&self) -> (usize, usize) {
        (self.history.sensor_count(), self.history.classification_count())
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
