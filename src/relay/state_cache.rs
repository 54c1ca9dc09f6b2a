use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::relay::record::Category;

/// Point-in-time copy of the live state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCacheView {
    pub sensor: Map<String, Value>,
    pub freshness_code: Option<String>,
    pub preservation_code: Option<String>,
    pub session_started_at: Option<DateTime<Utc>>,
}

impl LiveCacheView {
    pub fn code(&self, category: Category) -> Option<&str> {
        match category {
            Category::Freshness => self.freshness_code.as_deref(),
            Category::Preservation => self.preservation_code.as_deref(),
        }
    }
}

/// Live sensor snapshot, latest codes and session start.
///
/// Only the relay writes through this handle; everything else goes through a
/// [`LiveCacheReader`] and gets owned copies.
#[derive(Debug, Default)]
pub struct DeviceStateCache {
    inner: Arc<RwLock<LiveCacheView>>,
}

impl DeviceStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> LiveCacheReader {
        LiveCacheReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Shallow merge: each incoming key overwrites its previous value, keys
    /// not present in `fields` are left alone.
    pub fn update_sensor(&self, fields: &Map<String, Value>) {
        let mut cache = self.write();
        for (key, value) in fields {
            cache.sensor.insert(key.clone(), value.clone());
        }
    }

    pub fn set_code(&self, category: Category, code: String) {
        let mut cache = self.write();
        match category {
            Category::Freshness => cache.freshness_code = Some(code),
            Category::Preservation => cache.preservation_code = Some(code),
        }
    }

    pub fn start_session(&self, started_at: DateTime<Utc>) {
        self.write().session_started_at = Some(started_at);
    }

    /// Clears the sensor snapshot and session start. Codes survive.
    pub fn end_session(&self) {
        let mut cache = self.write();
        cache.sensor.clear();
        cache.session_started_at = None;
    }

    pub fn snapshot(&self) -> LiveCacheView {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, LiveCacheView> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LiveCacheView> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only handle on the live cache, cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct LiveCacheReader {
    inner: Arc<RwLock<LiveCacheView>>,
}

impl LiveCacheReader {
    pub fn snapshot(&self) -> LiveCacheView {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session_started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_partial_payloads_merge() {
        let cache = DeviceStateCache::new();

        cache.update_sensor(&fields(json!({"mq135_ppm": 12.5})));
        cache.update_sensor(&fields(json!({"T": 30})));

        assert_eq!(
            Value::Object(cache.snapshot().sensor),
            json!({"mq135_ppm": 12.5, "T": 30})
        );
    }

    #[test]
    fn test_later_value_wins_per_key() {
        let cache = DeviceStateCache::new();

        cache.update_sensor(&fields(json!({"T": 25.0, "RH": 60})));
        cache.update_sensor(&fields(json!({"T": 26.5, "anything_goes": "kept"})));

        let sensor = cache.snapshot().sensor;
        assert_eq!(sensor["T"], json!(26.5));
        assert_eq!(sensor["RH"], json!(60));
        assert_eq!(sensor["anything_goes"], json!("kept"));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_writes() {
        let cache = DeviceStateCache::new();
        let reader = cache.reader();

        cache.update_sensor(&fields(json!({"pH": 6.8})));
        let before = reader.snapshot();
        cache.update_sensor(&fields(json!({"pH": 7.1})));

        assert_eq!(before.sensor["pH"], json!(6.8));
        assert_eq!(reader.snapshot().sensor["pH"], json!(7.1));
    }

    #[test]
    fn test_end_session_keeps_codes() {
        let cache = DeviceStateCache::new();
        cache.update_sensor(&fields(json!({"T": 30})));
        cache.set_code(Category::Freshness, "S".to_string());
        cache.set_code(Category::Preservation, "SB".to_string());
        cache.start_session(Utc::now());

        cache.end_session();

        let view = cache.snapshot();
        assert!(view.sensor.is_empty());
        assert_eq!(view.session_started_at, None);
        assert_eq!(view.code(Category::Freshness), Some("S"));
        assert_eq!(view.code(Category::Preservation), Some("SB"));
    }
}
