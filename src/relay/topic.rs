use crate::relay::record::Category;

pub const DEFAULT_DEVICE_PREFIX: &str = "stm32";
pub const DEFAULT_APP_PREFIX: &str = "capstone/e03";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    SensorReading,
    Classification(Category),
    Unrecognized,
}

/// The three topics the relay understands. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMap {
    pub sensor: String,
    pub freshness: String,
    pub preservation: String,
}

impl TopicMap {
    pub fn new(device_prefix: &str, app_prefix: &str) -> Self {
        let device_prefix = device_prefix.trim_end_matches('/');
        let app_prefix = app_prefix.trim_end_matches('/');

        Self {
            sensor: format!("{}/sensor/data", device_prefix),
            freshness: format!("{}/fish", app_prefix),
            preservation: format!("{}/preservation", app_prefix),
        }
    }

    pub fn classify(&self, topic: &str) -> MessageClass {
        if topic == self.sensor {
            MessageClass::SensorReading
        } else if topic == self.freshness {
            MessageClass::Classification(Category::Freshness)
        } else if topic == self.preservation {
            MessageClass::Classification(Category::Preservation)
        } else {
            MessageClass::Unrecognized
        }
    }

    pub fn all(&self) -> Vec<String> {
        vec![
            self.sensor.clone(),
            self.freshness.clone(),
            self.preservation.clone(),
        ]
    }
}

impl Default for TopicMap {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_PREFIX, DEFAULT_APP_PREFIX)
    }
}
