use tracing::{debug, error, info};

use crate::relay::{
    broadcaster::{classification_event, message_envelope},
    decode::Classification,
    last_values::Transition,
    record::{Category, ClassificationRecord},
};
use crate::util::io::payload::Payload;

use super::Relay;

impl Relay {
    pub(super) fn on_classification(&mut self, category: Category, topic: &str, payload: &Payload) {
        let Classification { code, value, device } = Classification::decode(category, payload);

        // Relayed whether or not a code can be extracted.
        self.broadcaster
            .emit(classification_event(category), message_envelope(topic, payload));

        let Some(code) = code else {
            debug!("No {} code in message on {}, broadcast only", category, topic);
            return;
        };

        self.cache.set_code(category, code.clone());

        let record = ClassificationRecord {
            category,
            code,
            value,
            device_key: device,
            observed_at: self.now(),
        };
        self.history.push_classification(record.clone());

        match self.last_values.observe(category, &record.device_key, &record.code) {
            Transition::Unchanged => {
                debug!(
                    "↔️ {} unchanged ({}): {} (skip save)",
                    category, record.device_key, record.code
                );
                return;
            }
            Transition::First => {
                info!("{} first seen ({}): {}", category, record.device_key, record.code);
            }
            Transition::Changed { previous } => {
                info!(
                    "{} changed ({}): {} -> {}",
                    category, record.device_key, previous, record.code
                );
            }
        }

        if let Err(e) = self.persistence.submit(record) {
            error!("❌ Could not queue {} record: {}", category, e);
        }
    }
}
