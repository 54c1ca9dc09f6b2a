// src/util/io/payload.rs
use serde_json::{Map, Value};

/// Message body as handed over by a transport.
///
/// Bytes that parse as JSON become `Structured`; anything else is kept as
/// opaque text so it can still be relayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Structured(Value),
    Text(String),
}

impl Payload {
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Payload::Structured(value),
            Err(_) => Payload::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::decode(text.trim().as_bytes())
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Payload::Structured(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.as_structured().and_then(Value::as_object)
    }

    /// JSON form used when relaying the payload to live subscribers.
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Structured(value) => value.clone(),
            Payload::Text(text) => Value::String(text.clone()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_bytes_become_structured() {
        let payload = Payload::decode(br#"{"fresh":"S","freshValue":0.82}"#);
        assert_eq!(payload, Payload::Structured(json!({"fresh": "S", "freshValue": 0.82})));
        assert!(payload.as_object().is_some());
    }

    #[test]
    fn test_non_json_bytes_stay_text() {
        let payload = Payload::decode(b"sensor warming up");
        assert_eq!(payload, Payload::Text("sensor warming up".to_string()));
        assert_eq!(payload.to_value(), json!("sensor warming up"));
        assert!(payload.as_object().is_none());
    }

    #[test]
    fn test_scalar_json_is_structured_but_not_an_object() {
        let payload = Payload::from_text(" 42 ");
        assert_eq!(payload, Payload::Structured(json!(42)));
        assert!(payload.as_object().is_none());
    }
}
