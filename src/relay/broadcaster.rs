use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::relay::record::Category;
use crate::util::io::payload::Payload;

pub const SENSOR_DATA_EVENT: &str = "sensorData";
pub const FRESHNESS_EVENT: &str = "freshness";
pub const PRESERVATION_EVENT: &str = "preservation";
pub const SESSION_STATUS_EVENT: &str = "sessionStatus";

/// Fire-and-forget fan-out to whoever is listening right now.
pub trait Broadcaster: Send + Sync {
    fn emit(&self, event_name: &str, payload: Value);
}

pub fn classification_event(category: Category) -> &'static str {
    match category {
        Category::Freshness => FRESHNESS_EVENT,
        Category::Preservation => PRESERVATION_EVENT,
    }
}

/// Inbound messages are relayed untouched, tagged with their topic.
pub fn message_envelope(topic: &str, payload: &Payload) -> Value {
    json!({
        "topic": topic,
        "message": payload.to_value(),
    })
}

pub fn session_status(started_at: Option<DateTime<Utc>>) -> Value {
    json!({
        "active": started_at.is_some(),
        "startedAt": started_at.map(|t| t.to_rfc3339()),
    })
}
