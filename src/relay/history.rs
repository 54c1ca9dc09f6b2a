use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::relay::decode::SensorReading;
use crate::relay::record::ClassificationRecord;

pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedSensorReading {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub reading: SensorReading,
}

/// Everything observed during one monitoring session, handed to the exporter
/// when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub sensor_readings: Vec<TimedSensorReading>,
    /// Every classification seen, including the unchanged ones that were
    /// never persisted.
    pub classifications: Vec<ClassificationRecord>,
    pub dropped: usize,
}

impl SessionReport {
    pub fn is_empty(&self) -> bool {
        self.sensor_readings.is_empty() && self.classifications.is_empty()
    }
}

/// Bounded in-memory buffer for the current session. Oldest entries go first
/// once `limit` is reached.
#[derive(Debug)]
pub struct SessionHistory {
    limit: usize,
    sensor_readings: VecDeque<TimedSensorReading>,
    classifications: VecDeque<ClassificationRecord>,
    dropped: usize,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            sensor_readings: VecDeque::new(),
            classifications: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn push_sensor(&mut self, timestamp: DateTime<Utc>, reading: SensorReading) {
        if self.sensor_readings.len() >= self.limit {
            self.sensor_readings.pop_front();
            self.dropped += 1;
        }
        self.sensor_readings.push_back(TimedSensorReading { timestamp, reading });
    }

    pub fn push_classification(&mut self, record: ClassificationRecord) {
        if self.classifications.len() >= self.limit {
            self.classifications.pop_front();
            self.dropped += 1;
        }
        self.classifications.push_back(record);
    }

    pub fn sensor_count(&self) -> usize {
        self.sensor_readings.len()
    }

    pub fn classification_count(&self) -> usize {
        self.classifications.len()
    }

    /// Drain the buffer into a report, leaving it empty for the next session.
    pub fn take_report(&mut self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> SessionReport {
        let report = SessionReport {
            started_at,
            ended_at,
            sensor_readings: self.sensor_readings.drain(..).collect(),
            classifications: self.classifications.drain(..).collect(),
            dropped: self.dropped,
        };
        self.dropped = 0;
        report
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::decode::DeviceKey;
    use crate::relay::record::Category;

    fn reading(t: f64) -> SensorReading {
        SensorReading {
            temperature: Some(t),
            ..SensorReading::default()
        }
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = SessionHistory::new(2);
        let now = Utc::now();

        history.push_sensor(now, reading(1.0));
        history.push_sensor(now, reading(2.0));
        history.push_sensor(now, reading(3.0));

        let report = history.take_report(now, now);
        let temps: Vec<_> = report
            .sensor_readings
            .iter()
            .map(|r| r.reading.temperature)
            .collect();

        assert_eq!(temps, vec![Some(2.0), Some(3.0)]);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_take_report_empties_buffer() {
        let mut history = SessionHistory::default();
        let now = Utc::now();

        history.push_sensor(now, reading(25.0));
        history.push_classification(ClassificationRecord {
            category: Category::Freshness,
            code: "S".to_string(),
            value: Some(0.9),
            device_key: DeviceKey::default(),
            observed_at: now,
        });

        let report = history.take_report(now, now);
        assert!(!report.is_empty());
        assert_eq!(report.classifications.len(), 1);

        assert_eq!(history.sensor_count(), 0);
        assert_eq!(history.classification_count(), 0);
        assert!(history.take_report(now, now).is_empty());
    }
}
