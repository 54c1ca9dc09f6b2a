use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active { started_at: DateTime<Utc> },
}

/// Idle/Active monitoring session.
///
/// Only sensor readings open a session and only a transport disconnect closes
/// it. Repeating either trigger in the state it leads to changes nothing.
#[derive(Debug, Default)]
pub struct SessionTracker {
    state: SessionState,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Active { started_at } => Some(started_at),
            SessionState::Idle => None,
        }
    }

    /// Returns the start time when this reading opened a new session.
    pub fn observe_sensor_reading(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Active { .. } => None,
            SessionState::Idle => {
                self.state = SessionState::Active { started_at: now };
                Some(now)
            }
        }
    }

    /// Returns the start time of the session that was just closed.
    pub fn end(&mut self) -> Option<DateTime<Utc>> {
        let started_at = self.started_at();
        self.state = SessionState::Idle;
        started_at
    }
}
