use tracing::{debug, info};

use crate::relay::{
    broadcaster::{message_envelope, session_status, SENSOR_DATA_EVENT, SESSION_STATUS_EVENT},
    decode::SensorReading,
};
use crate::util::io::payload::Payload;

use super::Relay;

impl Relay {
    pub(super) fn on_sensor_reading(&mut self, topic: &str, payload: &Payload) {
        let now = self.now();

        if let Some(fields) = payload.as_object() {
            self.cache.update_sensor(fields);
        }

        if let Some(started_at) = self.session.observe_sensor_reading(now) {
            self.cache.start_session(started_at);
            info!("🟢 Monitoring session started at {}", started_at.to_rfc3339());
            self.broadcaster
                .emit(SESSION_STATUS_EVENT, session_status(Some(started_at)));
        }

        let reading = SensorReading::decode(payload);
        if reading.is_empty() {
            debug!("Sensor message on {} carried no known fields", topic);
        } else {
            debug!(?reading, "📊 sensor reading");
            self.history.push_sensor(now, reading);
        }

        self.broadcaster
            .emit(SENSOR_DATA_EVENT, message_envelope(topic, payload));
    }
}
