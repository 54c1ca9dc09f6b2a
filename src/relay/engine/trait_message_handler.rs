use tracing::{info, warn};

use crate::relay::topic::MessageClass;
use crate::util::io::payload::Payload;
use crate::util::io::transport::MessageHandler;

use super::Relay;

impl MessageHandler for Relay {
    fn on_connect(&mut self) {
        self.connected = true;
        info!("🔌 Transport connected");
    }

    fn on_disconnect(&mut self) {
        if self.connected {
            warn!("⚠️ Transport disconnected");
        }
        self.connected = false;
        self.end_session();
    }

    fn on_message(&mut self, topic: &str, payload: Payload) {
        match self.topics.classify(topic) {
            MessageClass::SensorReading => self.on_sensor_reading(topic, &payload),
            MessageClass::Classification(category) => self.on_classification(category, topic, &payload),
            MessageClass::Unrecognized => info!("Unknown topic: {}", topic),
        }
    }
}
