use tracing::{debug, error, info};

use crate::relay::broadcaster::{session_status, SESSION_STATUS_EVENT};

use super::Relay;

impl Relay {
    pub(super) fn end_session(&mut self) {
        let Some(started_at) = self.session.end() else {
            debug!("Disconnect while idle, no session to end");
            return;
        };

        let ended_at = self.now();
        let report = self.history.take_report(started_at, ended_at);

        // Blocking file write on the ingest task, bounded by the history limit.
        if let Some(exporter) = &self.exporter {
            match exporter.export(&report) {
                Ok(Some(path)) => info!("📄 Session exported to {}", path.display()),
                Ok(None) => {}
                Err(e) => error!("❌ Session export failed: {}", e),
            }
        }

        self.cache.end_session();

        if self.reset_change_gate_on_session_end {
            self.last_values.clear();
        }

        info!(
            "🔴 Monitoring session ended after {}s ({} readings, {} classifications)",
            (ended_at - started_at).num_seconds(),
            report.sensor_readings.len(),
            report.classifications.len()
        );

        self.broadcaster
            .emit(SESSION_STATUS_EVENT, session_status(None));
    }
}
